pub mod fetcher;
pub mod render;

use std::time::Duration;

use reqwest::{
    blocking::Client,
    StatusCode,
    Url,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    http::{
        ensure_success,
        http_client,
    },
    Config,
    LazyError,
};

pub use fetcher::DefinitionFetcher;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// One lexical entry as returned by the Free Dictionary API.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Phonetic {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

/// Definitions grouped under one part of speech.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Definition {
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

/// Read-only lookup of a word's first dictionary entry.
pub trait DictionarySource: Send + Sync {
    fn lookup(&self, word: &str) -> Result<Entry, LazyError>;
}

pub struct FreeDictionaryClient {
    client: Client,
    base_url: String,
}

impl FreeDictionaryClient {
    pub fn new(base_url: &str) -> Result<Self, LazyError> {
        Ok(Self { client: http_client(LOOKUP_TIMEOUT)?, base_url: base_url.to_string() })
    }

    pub fn from_config(config: &Config) -> Result<Self, LazyError> {
        Self::new(&config.dictionary_url)
    }

    fn entry_url(&self, word: &str) -> Result<Url, LazyError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| LazyError::Custom(format!("Invalid dictionary URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| LazyError::Custom(format!("Dictionary URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

impl DictionarySource for FreeDictionaryClient {
    fn lookup(&self, word: &str) -> Result<Entry, LazyError> {
        let url = self.entry_url(word)?;
        log::info!("parsing: {}", word);

        let resp = self.client.get(url).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(LazyError::LookupNotFound(word.to_string()));
        }
        ensure_success(&resp)?;

        let entries: Vec<Entry> = resp
            .json()
            .map_err(|e| LazyError::Transport(format!("Malformed dictionary response for '{word}': {e}")))?;

        entries.into_iter().next().ok_or_else(|| LazyError::LookupNotFound(word.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_api_payload() {
        let payload = r#"[{
            "word": "apple",
            "phonetic": "/ˈæp.əl/",
            "phonetics": [{"text": "/ˈæp.əl/", "audio": ""}, {"audio": "https://x/apple-us.mp3"}],
            "meanings": [{
                "partOfSpeech": "noun",
                "definitions": [{"definition": "A fruit.", "synonyms": [], "antonyms": []}],
                "synonyms": ["pome"],
                "antonyms": []
            }]
        }]"#;
        let entries: Vec<Entry> = serde_json::from_str(payload).unwrap();
        let entry = &entries[0];
        assert_eq!(entry.word, "apple");
        assert_eq!(entry.phonetics.len(), 2);
        assert_eq!(entry.meanings[0].part_of_speech, "noun");
        assert_eq!(entry.meanings[0].synonyms, vec!["pome"]);
        assert!(entry.meanings[0].definitions[0].example.is_none());
    }

    #[test]
    fn entry_url_escapes_word() {
        let client = FreeDictionaryClient::new(crate::core::config::DEFAULT_DICTIONARY_URL).unwrap();
        let url = client.entry_url("ice cream").unwrap();
        assert_eq!(url.as_str(), "https://api.dictionaryapi.dev/api/v2/entries/en/ice%20cream");

        let trailing = FreeDictionaryClient::new("https://example.org/entries/en/").unwrap();
        assert_eq!(
            trailing.entry_url("apple").unwrap().as_str(),
            "https://example.org/entries/en/apple"
        );
    }
}
