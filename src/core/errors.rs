use thiserror::Error;

#[derive(Error, Debug)]
pub enum LazyError {
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error value reported by AnkiConnect itself, kept verbatim.
    #[error("{0}")]
    Remote(String),

    #[error("No dictionary entry found for '{0}'")]
    LookupNotFound(String),

    #[error("Cache error: {0}")]
    CacheIo(String),

    #[error("Config error: {0}")]
    ConfigIo(String),

    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HJson error: {0}")]
    HJson(#[from] serde_hjson::Error),

    #[error("LazyError: {0}")]
    Custom(String),
}

impl LazyError {
    /// Failures that belong to a single word and must not stop its siblings.
    pub fn is_word_scoped(&self) -> bool {
        matches!(self, LazyError::LookupNotFound(_) | LazyError::Transport(_))
    }
}

impl From<std::io::Error> for LazyError {
    fn from(error: std::io::Error) -> Self {
        LazyError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for LazyError {
    fn from(error: reqwest::Error) -> Self {
        LazyError::Transport(error.to_string())
    }
}
