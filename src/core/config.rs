use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::LazyError;
use crate::persistence::{
    get_data_file_path,
    read_optional,
    save_json_atomic,
};

pub const DEFAULT_MODEL_NAME: &str = "Lazy English Cards";
pub const DEFAULT_DECK_NAME: &str = "Lazy English";
pub const DEFAULT_WORDLIST: &str = "words.txt";
pub const DEFAULT_ANKI_URL: &str = "http://localhost:8765";
pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";
pub const CONFIG_FILE: &str = "config.hjson";
const CACHE_FILE: &str = "cached_words.json";
const STATE_FILE: &str = "created.json";

/// External dictionaries linked from the back of every card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryLinks {
    pub oxford: bool,
    pub cambridge: bool,
    pub macmillan: bool,
    pub urban_dictionary: bool,
    pub cambridge_ru: bool,
}

impl Default for DictionaryLinks {
    fn default() -> Self {
        Self {
            oxford: false,
            cambridge: true,
            macmillan: true,
            urban_dictionary: true,
            cambridge_ru: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model_name: String,
    pub deck_name: String,
    pub cache_enabled: bool,
    pub cache_path: PathBuf,
    pub state_path: PathBuf,
    pub wordlist_path: PathBuf,
    pub anki_url: String,
    pub dictionary_url: String,
    pub allow_duplicate: bool,
    pub templates_dir: Option<PathBuf>,
    pub dictionaries: DictionaryLinks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            deck_name: DEFAULT_DECK_NAME.to_string(),
            cache_enabled: true,
            cache_path: get_data_file_path(CACHE_FILE),
            state_path: get_data_file_path(STATE_FILE),
            wordlist_path: PathBuf::from(DEFAULT_WORDLIST),
            anki_url: DEFAULT_ANKI_URL.to_string(),
            dictionary_url: DEFAULT_DICTIONARY_URL.to_string(),
            allow_duplicate: false,
            templates_dir: None,
            dictionaries: DictionaryLinks::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        get_data_file_path(CONFIG_FILE)
    }

    /// Missing file yields the defaults; an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, LazyError> {
        let content = read_optional(path).map_err(|e| {
            LazyError::ConfigIo(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let Some(content) = content else {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_hjson::from_str::<Config>(&content)
            .map_err(|e| LazyError::ConfigIo(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<(), LazyError> {
        save_json_atomic(self, path).map_err(|e| {
            LazyError::ConfigIo(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Names of the fields whose values differ from `other`.
    pub fn diff(&self, other: &Config) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.model_name != other.model_name {
            changed.push("model_name");
        }
        if self.deck_name != other.deck_name {
            changed.push("deck_name");
        }
        if self.cache_enabled != other.cache_enabled {
            changed.push("cache_enabled");
        }
        if self.cache_path != other.cache_path {
            changed.push("cache_path");
        }
        if self.state_path != other.state_path {
            changed.push("state_path");
        }
        if self.wordlist_path != other.wordlist_path {
            changed.push("wordlist_path");
        }
        if self.anki_url != other.anki_url {
            changed.push("anki_url");
        }
        if self.dictionary_url != other.dictionary_url {
            changed.push("dictionary_url");
        }
        if self.allow_duplicate != other.allow_duplicate {
            changed.push("allow_duplicate");
        }
        if self.templates_dir != other.templates_dir {
            changed.push("templates_dir");
        }
        if self.dictionaries != other.dictionaries {
            changed.push("dictionaries");
        }
        changed
    }
}
