use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    path::{
        Path,
        PathBuf,
    },
};

use super::{
    Config,
    LazyError,
};
use crate::{
    anki::types::Note,
    persistence::{
        delete_data_file,
        read_optional,
        save_json_atomic,
    },
};

/// Word → rendered note. A word present here is never fetched again.
#[derive(Debug)]
pub struct NoteCache {
    enabled: bool,
    path: PathBuf,
    notes: HashMap<String, Note>,
}

impl NoteCache {
    pub fn new(path: &Path, enabled: bool) -> Self {
        Self { enabled, path: path.to_path_buf(), notes: HashMap::new() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::load(&config.cache_path, config.cache_enabled)
    }

    /// Missing, empty and unreadable files all give an empty cache.
    pub fn load(path: &Path, enabled: bool) -> Self {
        let mut cache = Self::new(path, enabled);
        if !enabled {
            return cache;
        }

        match read_cache_file(path) {
            Ok(notes) => {
                log::info!("Loaded {} cached words from {}", notes.len(), path.display());
                cache.notes = notes;
            }
            Err(e) => {
                log::warn!("{}. Starting with an empty cache.", e);
            }
        }
        cache
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, word: &str) -> Option<&Note> {
        if !self.enabled {
            return None;
        }
        self.notes.get(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn put(&mut self, word: &str, note: Note) {
        if self.enabled {
            self.notes.insert(word.to_string(), note);
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes(&self) -> &HashMap<String, Note> {
        &self.notes
    }

    /// Rewrites the whole cache file. Nothing is written while caching is disabled.
    pub fn flush(&self) -> Result<(), LazyError> {
        if !self.enabled {
            return Ok(());
        }

        let sorted: BTreeMap<&String, &Note> = self.notes.iter().collect();
        save_json_atomic(&sorted, &self.path).map_err(|e| {
            LazyError::CacheIo(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        log::info!("Cached {} words in {}", self.notes.len(), self.path.display());
        Ok(())
    }

    /// Drops every entry and removes the cache file.
    pub fn delete(&mut self) -> Result<(), LazyError> {
        self.notes.clear();
        Self::delete_at(&self.path)
    }

    /// Removes the cache file at `path` without loading it.
    pub fn delete_at(path: &Path) -> Result<(), LazyError> {
        delete_data_file(path)
            .map_err(|e| LazyError::CacheIo(format!("Failed to delete {}: {}", path.display(), e)))
    }
}

fn read_cache_file(path: &Path) -> Result<HashMap<String, Note>, LazyError> {
    let content = read_optional(path)
        .map_err(|e| LazyError::CacheIo(format!("Failed to read {}: {}", path.display(), e)))?;

    match content {
        None => Ok(HashMap::new()),
        Some(content) if content.trim().is_empty() => Ok(HashMap::new()),
        Some(content) => serde_json::from_str(&content)
            .map_err(|e| LazyError::CacheIo(format!("Failed to parse {}: {}", path.display(), e))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::dictionary::{
        fetcher::tests::simple_entry,
        render::render_note,
    };

    fn note(word: &str) -> Note {
        render_note(word, &simple_entry(word)).unwrap()
    }

    #[test]
    fn missing_and_empty_files_load_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_words.json");
        assert!(NoteCache::load(&path, true).is_empty());

        fs::write(&path, "").unwrap();
        assert!(NoteCache::load(&path, true).is_empty());

        fs::write(&path, "  \n").unwrap();
        assert!(NoteCache::load(&path, true).is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_words.json");
        fs::write(&path, "{\"apple\": {\"fields\": ").unwrap();
        assert!(NoteCache::load(&path, true).is_empty());
        assert!(matches!(read_cache_file(&path), Err(LazyError::CacheIo(_))));
    }

    #[test]
    fn flush_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".cache").join("cached_words.json");
        let mut cache = NoteCache::new(&path, true);
        cache.put("apple", note("apple"));
        cache.put("Light", note("Light"));
        cache.flush().unwrap();

        let loaded = NoteCache::load(&path, true);
        assert_eq!(loaded.notes(), cache.notes());
        assert!(loaded.contains("Light"));
        assert!(!loaded.contains("light"));
    }

    #[test]
    fn disabled_cache_never_hits_or_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_words.json");

        let mut seeded = NoteCache::new(&path, true);
        seeded.put("apple", note("apple"));
        seeded.flush().unwrap();

        let mut cache = NoteCache::load(&path, false);
        assert!(cache.get("apple").is_none());
        cache.put("pear", note("pear"));
        assert!(cache.get("pear").is_none());

        fs::remove_file(&path).unwrap();
        cache.flush().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn delete_clears_entries_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cached_words.json");
        let mut cache = NoteCache::new(&path, true);
        cache.put("apple", note("apple"));
        cache.flush().unwrap();

        cache.delete().unwrap();
        assert!(cache.is_empty());
        assert!(!path.exists());
    }
}
