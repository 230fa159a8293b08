use std::{
    thread,
    time::Duration,
};

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::{
    json,
    Map,
    Value,
};

use super::types::{
    CreateModelParams,
    NoteParams,
};
use crate::core::{
    http::http_client,
    Config,
    LazyError,
};

pub const API_VERSION: u8 = 6;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Actions of the AnkiConnect API this crate uses.
/// https://github.com/FooSoft/anki-connect#supported-actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Version,
    ModelNames,
    DeckNames,
    CreateModel,
    CreateDeck,
    AddNotes,
    DeleteDecks,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Version => "version",
            Action::ModelNames => "modelNames",
            Action::DeckNames => "deckNames",
            Action::CreateModel => "createModel",
            Action::CreateDeck => "createDeck",
            Action::AddNotes => "addNotes",
            Action::DeleteDecks => "deleteDecks",
        }
    }
}

/// Carries one request body to AnkiConnect and returns the raw response body.
pub trait AnkiTransport: Send + Sync {
    fn post(&self, body: &Value) -> Result<Value, LazyError>;
}

pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str) -> Result<Self, LazyError> {
        Ok(Self { client: http_client(REQUEST_TIMEOUT)?, url: url.to_string() })
    }
}

impl AnkiTransport for HttpTransport {
    fn post(&self, body: &Value) -> Result<Value, LazyError> {
        let response = self.client.post(&self.url).json(body).send().map_err(|e| {
            LazyError::Transport(format!("AnkiConnect unreachable at {}: {}", self.url, e))
        })?;

        response
            .json::<Value>()
            .map_err(|e| LazyError::Transport(format!("Malformed AnkiConnect response: {e}")))
    }
}

pub fn make_request(action: Action, params: Option<Value>) -> Value {
    let mut body = Map::new();
    body.insert("action".to_string(), Value::String(action.as_str().to_string()));
    body.insert("params".to_string(), params.unwrap_or_else(|| Value::Object(Map::new())));
    body.insert("version".to_string(), Value::Number(API_VERSION.into()));
    Value::Object(body)
}

/// Validates the `{error, result}` envelope and extracts the typed result.
pub fn parse_response<T: DeserializeOwned>(action: Action, response: Value) -> Result<T, LazyError> {
    let Value::Object(mut envelope) = response else {
        return Err(LazyError::Transport("response is not a JSON object".to_string()));
    };

    if envelope.len() != 2 {
        return Err(LazyError::Transport(
            "response has an unexpected number of fields".to_string(),
        ));
    }
    let Some(error) = envelope.remove("error") else {
        return Err(LazyError::Transport("response is missing required error field".to_string()));
    };
    let Some(result) = envelope.remove("result") else {
        return Err(LazyError::Transport("response is missing required result field".to_string()));
    };

    match error {
        Value::Null => {}
        Value::String(message) => return Err(LazyError::Remote(message)),
        other => return Err(LazyError::Remote(other.to_string())),
    }

    serde_json::from_value(result).map_err(|e| {
        LazyError::Transport(format!("unexpected result for {}: {}", action.as_str(), e))
    })
}

/// Typed wrapper around the single AnkiConnect endpoint. Holds no mutable state,
/// so one instance can be shared by every caller.
pub struct AnkiClient<T: AnkiTransport = HttpTransport> {
    transport: T,
}

impl AnkiClient<HttpTransport> {
    pub fn from_config(config: &Config) -> Result<Self, LazyError> {
        Ok(Self::new(HttpTransport::new(&config.anki_url)?))
    }
}

impl<T: AnkiTransport> AnkiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn invoke<R: DeserializeOwned>(
        &self,
        action: Action,
        params: Option<Value>,
    ) -> Result<R, LazyError> {
        let body = make_request(action, params);
        log::debug!("AnkiConnect -> {}", action.as_str());
        let response = self.transport.post(&body)?;
        parse_response(action, response)
    }

    //Will just use to check if ankiconnect is online
    pub fn version(&self) -> Result<u32, LazyError> {
        self.invoke(Action::Version, None)
    }

    pub fn model_names(&self) -> Result<Vec<String>, LazyError> {
        self.invoke(Action::ModelNames, None)
    }

    pub fn deck_names(&self) -> Result<Vec<String>, LazyError> {
        self.invoke(Action::DeckNames, None)
    }

    pub fn create_model(&self, params: &CreateModelParams) -> Result<(), LazyError> {
        let params = serde_json::to_value(params)?;
        let _: Value = self.invoke(Action::CreateModel, Some(params))?;
        Ok(())
    }

    pub fn create_deck(&self, deck_name: &str) -> Result<u64, LazyError> {
        self.invoke(Action::CreateDeck, Some(json!({ "deck": deck_name })))
    }

    /// One entry per submitted note: the new note id, or `None` when Anki skipped it.
    pub fn add_notes(&self, notes: &[NoteParams]) -> Result<Vec<Option<u64>>, LazyError> {
        self.invoke(Action::AddNotes, Some(json!({ "notes": notes })))
    }

    /// Deletes decks together with the cards in them.
    pub fn delete_decks(&self, deck_names: &[String]) -> Result<(), LazyError> {
        let _: Value =
            self.invoke(Action::DeleteDecks, Some(json!({ "decks": deck_names, "cardsToo": true })))?;
        Ok(())
    }

    pub fn wait_awake(&self, wait_time: Duration, max_attempts: u32) -> bool {
        for attempt in 1..=max_attempts {
            match self.version() {
                Ok(version) => {
                    log::info!("AnkiConnect is online. Version: {}", version);
                    return true;
                }
                Err(err) => {
                    log::warn!(
                        "AnkiConnect attempt {} of {} failed. Retrying in {:?}... Error: {}",
                        attempt,
                        max_attempts,
                        wait_time,
                        err
                    );
                    if attempt < max_attempts {
                        thread::sleep(wait_time);
                    }
                }
            }
        }
        false
    }
}
