use std::{
    collections::HashMap,
    path::Path,
    time::Instant,
};

use thiserror::Error;

use super::{
    batch::DEFAULT_CHUNK_SIZE,
    BatchScheduler,
    Config,
    ConfigStateTracker,
    Freshness,
    LazyError,
    NoteCache,
};
use crate::{
    anki::{
        model::build_model,
        AnkiClient,
        AnkiTransport,
        HttpTransport,
        Note,
        NoteParams,
    },
    dictionary::{
        DefinitionFetcher,
        DictionarySource,
        FreeDictionaryClient,
    },
};

#[derive(Debug, Clone)]
pub struct FetchedNote {
    pub index: usize,
    pub word: String,
    pub note: Note,
    pub from_cache: bool,
}

#[derive(Debug)]
pub struct WordFailure {
    pub index: usize,
    pub word: String,
    pub error: LazyError,
}

/// Per-word results of a batch fetch, both halves in input order.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub notes: Vec<FetchedNote>,
    pub failures: Vec<WordFailure>,
}

impl FetchOutcome {
    /// Number of words that went to the dictionary.
    pub fn fetched(&self) -> usize {
        self.notes.iter().filter(|n| !n.from_cache).count()
    }

}

#[derive(Debug)]
pub struct RunReport {
    pub provisioned: bool,
    pub notes: Vec<FetchedNote>,
    pub failures: Vec<WordFailure>,
    /// One entry per submitted note; `None` when Anki skipped it as a duplicate.
    pub note_ids: Vec<Option<u64>>,
}

impl RunReport {
    pub fn added(&self) -> usize {
        self.note_ids.iter().filter(|id| id.is_some()).count()
    }

    pub fn skipped(&self) -> usize {
        self.note_ids.iter().filter(|id| id.is_none()).count()
    }

    pub fn failed_words(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.word.as_str()).collect()
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Provisioning failed: {0}")]
    Provisioning(#[source] LazyError),

    /// The fetched notes are handed back so submission can be retried as is.
    #[error("Submission failed: {source}")]
    Submission {
        source: LazyError,
        notes: Vec<FetchedNote>,
        failures: Vec<WordFailure>,
    },

    #[error("Saving the note cache failed: {0}")]
    Persistence(#[source] LazyError),
}

/// Provision, fetch, submit, persist.
pub struct Pipeline<T: AnkiTransport = HttpTransport, S: DictionarySource = FreeDictionaryClient> {
    config: Config,
    client: AnkiClient<T>,
    fetcher: DefinitionFetcher<S>,
    cache: NoteCache,
    tracker: ConfigStateTracker,
    scheduler: BatchScheduler,
}

impl Pipeline<HttpTransport, FreeDictionaryClient> {
    pub fn from_config(config: Config) -> Result<Self, LazyError> {
        let client = AnkiClient::from_config(&config)?;
        let fetcher = DefinitionFetcher::from_config(&config)?;
        let scheduler = BatchScheduler::new(DEFAULT_CHUNK_SIZE)?;
        Self::new(config, client, fetcher, scheduler)
    }
}

impl<T: AnkiTransport, S: DictionarySource> Pipeline<T, S> {
    pub fn new(
        config: Config,
        client: AnkiClient<T>,
        fetcher: DefinitionFetcher<S>,
        scheduler: BatchScheduler,
    ) -> Result<Self, LazyError> {
        let cache = NoteCache::from_config(&config);
        let tracker = ConfigStateTracker::from_config(&config)?;
        Ok(Self { config, client, fetcher, cache, tracker, scheduler })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &AnkiClient<T> {
        &self.client
    }

    pub fn fetcher(&self) -> &DefinitionFetcher<S> {
        &self.fetcher
    }

    pub fn cache(&self) -> &NoteCache {
        &self.cache
    }

    pub fn tracker(&self) -> &ConfigStateTracker {
        &self.tracker
    }

    /// Makes sure the model and deck exist when the tracker is Stale. A Fresh
    /// tracker is trusted without asking Anki. Returns whether provisioning ran.
    pub fn ensure_provisioned(&mut self) -> Result<bool, LazyError> {
        if !self.tracker.needs_provisioning() {
            log::debug!("Structural objects are up to date, skipping provisioning");
            return Ok(false);
        }

        log::info!("Initialization...");
        let model_name = &self.config.model_name;
        let deck_name = &self.config.deck_name;
        let mut created_models = Vec::new();
        let mut created_decks = Vec::new();

        if !self.client.model_names()?.contains(model_name) {
            self.client.create_model(&build_model(&self.config)?)?;
            log::info!("Created model '{}'", model_name);
            created_models.push(model_name.clone());
        }
        if !self.client.deck_names()?.contains(deck_name) {
            self.client.create_deck(deck_name)?;
            log::info!("Created deck '{}'", deck_name);
            created_decks.push(deck_name.clone());
        } else {
            log::debug!("Using existing deck '{}'", deck_name);
        }

        self.tracker.record_provisioned(&self.config, &created_models, &created_decks)?;
        log::info!("Ready to use");
        Ok(true)
    }

    /// Resolves every word through the cache or the dictionary. Failures stay
    /// attached to their word and never stop the other words.
    pub fn fetch_notes(&self, words: &[String]) -> FetchOutcome {
        let start = Instant::now();
        let cache = &self.cache;
        let fetcher = &self.fetcher;

        let results = self.scheduler.run(words, |chunk| fetch_chunk(chunk, cache, fetcher));

        let mut outcome = FetchOutcome::default();
        for (index, (word, result)) in words.iter().zip(results).enumerate() {
            match result {
                Ok((note, from_cache)) => {
                    outcome.notes.push(FetchedNote { index, word: word.clone(), note, from_cache })
                }
                Err(error) => {
                    if error.is_word_scoped() {
                        log::warn!("Skipping '{}': {}", word, error);
                    } else {
                        log::error!("Failed to render '{}': {}", word, error);
                    }
                    outcome.failures.push(WordFailure { index, word: word.clone(), error });
                }
            }
        }

        log::info!(
            "Resolved {} of {} words, {} fetched ({:.1}s)",
            outcome.notes.len(),
            words.len(),
            outcome.fetched(),
            start.elapsed().as_secs_f32()
        );
        outcome
    }

    /// Stores freshly fetched notes in the in-memory cache.
    pub fn remember(&mut self, notes: &[FetchedNote]) {
        for fetched in notes.iter().filter(|n| !n.from_cache) {
            self.cache.put(&fetched.word, fetched.note.clone());
        }
    }

    pub fn submit(&self, notes: &[FetchedNote]) -> Result<Vec<Option<u64>>, LazyError> {
        if notes.is_empty() {
            log::info!("Nothing to submit");
            return Ok(Vec::new());
        }

        let params: Vec<NoteParams> = notes
            .iter()
            .map(|n| {
                NoteParams::new(
                    &n.note,
                    &self.config.deck_name,
                    &self.config.model_name,
                    self.config.allow_duplicate,
                )
            })
            .collect();

        let ids = self.client.add_notes(&params)?;
        let added = ids.iter().filter(|id| id.is_some()).count();
        log::info!("Cards created: {} added, {} skipped", added, ids.len() - added);
        Ok(ids)
    }

    pub fn run(&mut self, words: &[String]) -> Result<RunReport, RunError> {
        let provisioned = self.ensure_provisioned().map_err(RunError::Provisioning)?;

        log::info!("Creating cards...");
        let outcome = self.fetch_notes(words);
        self.remember(&outcome.notes);

        let note_ids = match self.submit(&outcome.notes) {
            Ok(ids) => ids,
            Err(source) => {
                return Err(RunError::Submission {
                    source,
                    notes: outcome.notes,
                    failures: outcome.failures,
                })
            }
        };

        self.cache.flush().map_err(RunError::Persistence)?;

        Ok(RunReport { provisioned, notes: outcome.notes, failures: outcome.failures, note_ids })
    }

    /// Retries the submission of notes handed back by `RunError::Submission`.
    pub fn resubmit(&mut self, notes: &[FetchedNote]) -> Result<Vec<Option<u64>>, RunError> {
        let ids = self.submit(notes).map_err(|source| RunError::Submission {
            source,
            notes: notes.to_vec(),
            failures: Vec::new(),
        })?;
        self.cache.flush().map_err(RunError::Persistence)?;
        Ok(ids)
    }

    /// Writes `config` to `path` and lets the tracker decide whether the next
    /// run has to provision again. This pipeline keeps the configuration it was
    /// built with.
    pub fn save_config(&mut self, config: &Config, path: &Path) -> Result<Freshness, LazyError> {
        config.save(path)?;
        self.tracker.config_saved(config)
    }

    /// Forgets everything created so far: the structural record and the cache
    /// file. With `delete_remote_decks`, the decks this tool created are deleted
    /// from Anki first, cards included.
    pub fn reset(&mut self, delete_remote_decks: bool) -> Result<(), LazyError> {
        let decks = self.tracker.state().created_decks.clone();
        if delete_remote_decks && !decks.is_empty() {
            self.client.delete_decks(&decks)?;
            log::info!("Deleted decks: {}", decks.join(", "));
        }
        self.tracker.reset()?;
        self.cache.delete()?;
        log::info!("Structural data reset");
        Ok(())
    }
}

/// Removes the structural record and the cache file named by `config` without
/// reading either one. Works when the record is corrupt; Anki is not touched.
pub fn reset_local(config: &Config) -> Result<(), LazyError> {
    ConfigStateTracker::reset_at(&config.state_path)?;
    NoteCache::delete_at(&config.cache_path)?;
    log::info!("Structural data reset");
    Ok(())
}

/// Runs inside one worker: words are handled in order, cache first. A word
/// repeated within the chunk is fetched once.
fn fetch_chunk<S: DictionarySource>(
    chunk: &[String],
    cache: &NoteCache,
    fetcher: &DefinitionFetcher<S>,
) -> Vec<Result<(Note, bool), LazyError>> {
    let mut fetched_here: HashMap<&str, Note> = HashMap::new();

    chunk
        .iter()
        .map(|word| {
            if let Some(note) = cache.get(word).or_else(|| fetched_here.get(word.as_str())) {
                log::debug!("cached: {}", word);
                return Ok((note.clone(), true));
            }

            let note = fetcher.fetch(word)?;
            if cache.is_enabled() {
                fetched_here.insert(word.as_str(), note.clone());
            }
            Ok((note, false))
        })
        .collect()
}
