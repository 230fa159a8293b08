use super::{
    render::render_note,
    DictionarySource,
    FreeDictionaryClient,
};
use crate::{
    anki::types::Note,
    core::{
        Config,
        LazyError,
    },
};

/// Looks a word up and renders it into note fields.
pub struct DefinitionFetcher<S: DictionarySource = FreeDictionaryClient> {
    source: S,
}

impl DefinitionFetcher<FreeDictionaryClient> {
    pub fn from_config(config: &Config) -> Result<Self, LazyError> {
        Ok(Self::new(FreeDictionaryClient::from_config(config)?))
    }
}

impl<S: DictionarySource> DefinitionFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn fetch(&self, word: &str) -> Result<Note, LazyError> {
        let entry = self.source.lookup(word)?;
        render_note(word, &entry)
    }
}
