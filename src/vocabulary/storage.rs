//! File-backed store for vocabulary entries
//!
//! Directory structure:
//! ```text
//! vocabulary/
//! └── {entry-id}.json   # One file per entry, keyed by its derived id
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::models::{EntryId, Relation, VocabEntry};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// In-memory set of vocabulary entries mirrored to one JSON file per entry
pub struct EntryStore {
    directory: PathBuf,
    entries: Vec<VocabEntry>,
    index: HashMap<EntryId, usize>,
}

impl EntryStore {
    /// Create an empty store rooted at `directory` without touching the disk
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a store and load every entry found in `directory`
    pub fn open(directory: PathBuf) -> Result<Self> {
        let mut store = Self::new(directory);
        store.load()?;
        Ok(store)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry_path(&self, id: EntryId) -> PathBuf {
        self.directory.join(format!("{}.json", id))
    }

    /// Reload the in-memory set from disk.
    ///
    /// Unreadable or corrupt files are skipped with a warning. Returns the
    /// number of entries loaded.
    pub fn load(&mut self) -> Result<usize> {
        self.entries.clear();
        self.index.clear();
        fs::create_dir_all(&self.directory)?;

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
            .collect();
        // read_dir order is platform dependent
        paths.sort();

        for path in paths {
            match Self::read_entry(&path) {
                Ok(entry) => self.insert(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable vocabulary entry {:?}: {}", path, e);
                }
            }
        }

        log::debug!(
            "Loaded {} vocabulary entries from {:?}",
            self.entries.len(),
            self.directory
        );
        Ok(self.entries.len())
    }

    fn read_entry(path: &Path) -> Result<VocabEntry> {
        let content = fs::read_to_string(path)?;
        let entry: VocabEntry = serde_json::from_str(&content)?;
        Ok(entry)
    }

    /// Read a single entry by id straight from disk
    pub fn load_entry(&self, id: EntryId) -> Result<VocabEntry> {
        let path = self.entry_path(id);
        if !path.exists() {
            return Err(StoreError::EntryNotFound(id));
        }
        Self::read_entry(&path)
    }

    fn insert(&mut self, entry: VocabEntry) {
        match self.index.get(&entry.id()) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.id(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    // ==================== Queries ====================

    pub fn all(&self) -> &[VocabEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&VocabEntry> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn by_language(&self, language: &str) -> Vec<&VocabEntry> {
        self.entries
            .iter()
            .filter(|e| e.language() == language)
            .collect()
    }

    pub fn by_vocab_types(&self, vocab_types: &[String]) -> Vec<&VocabEntry> {
        self.entries
            .iter()
            .filter(|e| e.vocab_types() == vocab_types)
            .collect()
    }

    pub fn by_language_and_types(&self, language: &str, vocab_types: &[String]) -> Vec<&VocabEntry> {
        self.entries
            .iter()
            .filter(|e| e.language() == language && e.vocab_types() == vocab_types)
            .collect()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for entry in &self.entries {
            for category in &entry.categories {
                if seen.insert(category.as_str()) {
                    categories.push(category.clone());
                }
            }
        }
        categories
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VocabEntry> {
        self.entries.iter()
    }

    // ==================== Mutation ====================

    /// Insert (or replace) an entry, optionally writing it to disk right away.
    ///
    /// The in-memory set is only updated once the write succeeded.
    pub fn add(&mut self, entry: VocabEntry, persist: bool) -> Result<()> {
        if persist {
            self.save_entry(&entry)?;
        }
        self.insert(entry);
        Ok(())
    }

    /// Add several entries; a failed write drops that entry and continues.
    /// Returns the number of entries added.
    pub fn extend<I>(&mut self, entries: I, persist: bool) -> usize
    where
        I: IntoIterator<Item = VocabEntry>,
    {
        let mut added = 0;
        for entry in entries {
            let id = entry.id();
            match self.add(entry, persist) {
                Ok(()) => added += 1,
                Err(e) => log::warn!("Dropping vocabulary entry {}: {}", id, e),
            }
        }
        added
    }

    pub fn save_entry(&self, entry: &VocabEntry) -> Result<()> {
        fs::create_dir_all(&self.directory)?;
        let path = self.entry_path(entry.id());
        fs::write(&path, serde_json::to_string_pretty(entry)?)?;
        Ok(())
    }

    /// Write every in-memory entry; returns how many failed.
    pub fn save_all(&self) -> usize {
        let mut failed = 0;
        for entry in &self.entries {
            if let Err(e) = self.save_entry(entry) {
                log::warn!("Failed to save vocabulary entry {}: {}", entry.id(), e);
                failed += 1;
            }
        }
        failed
    }

    // ==================== Graph ====================

    /// Follow `example_sentence` edges of `entry`.
    ///
    /// Targets are deduplicated by id; edges whose target is neither in memory
    /// nor readable from disk are skipped.
    pub fn resolve_linked_sentences(&self, entry: &VocabEntry) -> Vec<VocabEntry> {
        let mut seen = HashSet::new();
        let mut sentences = Vec::new();

        for target_id in entry.links(Relation::ExampleSentence) {
            if !seen.insert(target_id) {
                continue;
            }
            if let Some(found) = self.get(target_id) {
                sentences.push(found.clone());
                continue;
            }
            match self.load_entry(target_id) {
                Ok(found) => sentences.push(found),
                Err(e) => {
                    log::debug!("Skipping linked sentence {} of {}: {}", target_id, entry.id(), e);
                }
            }
        }

        sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::models::link_example_sentence;
    use tempfile::TempDir;

    fn create_test_store() -> (EntryStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = EntryStore::open(temp_dir.path().join("vocabulary")).unwrap();
        (store, temp_dir)
    }

    fn entry(meaning: &str, language: &str, types: &[&str], word: &str) -> VocabEntry {
        VocabEntry::new(meaning, language, types.iter().map(|t| t.to_string()).collect())
            .unwrap()
            .with_word(word)
    }

    #[test]
    fn test_persist_and_reload_roundtrip() {
        let (mut store, _temp) = create_test_store();

        let mut base = entry("dog", "fr", &["noun"], "(le) chien")
            .with_categories(vec!["animals".into(), "basics".into()]);
        let mut sentence = entry("the dog sleeps", "fr", &["phrase"], "le chien dort");
        link_example_sentence(&mut base, &mut sentence);

        store.add(base.clone(), true).unwrap();
        store.add(sentence.clone(), true).unwrap();

        let loaded = store.load_entry(base.id()).unwrap();
        assert_eq!(loaded.word, base.word);
        assert_eq!(loaded.categories, base.categories);
        assert_eq!(loaded.vocab_types(), base.vocab_types());
        assert_eq!(loaded.linked_items(), base.linked_items());

        let reopened = EntryStore::open(store.directory().to_path_buf()).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get(sentence.id()), Some(&sentence));
    }

    #[test]
    fn test_add_deduplicates_by_id() {
        let (mut store, _temp) = create_test_store();

        store.add(entry("dog", "fr", &["noun"], "chien"), true).unwrap();
        store.add(entry("dog", "fr", &["noun"], "le chien"), true).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].word, "le chien");

        store.load().unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_skips_corrupt_files() {
        let (mut store, _temp) = create_test_store();
        store.add(entry("dog", "fr", &["noun"], "chien"), true).unwrap();

        fs::write(store.directory().join("broken.json"), "{ not json").unwrap();
        fs::write(store.directory().join("notes.txt"), "ignored").unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, 1);
    }

    #[test]
    fn test_filters() {
        let (mut store, _temp) = create_test_store();
        store.add(entry("dog", "fr", &["noun"], "chien"), false).unwrap();
        store.add(entry("dog", "de", &["noun"], "Hund"), false).unwrap();
        store.add(entry("hello", "fr", &["phrase"], "bonjour"), false).unwrap();

        let noun = vec!["noun".to_string()];
        assert_eq!(store.by_language("fr").len(), 2);
        assert_eq!(store.by_vocab_types(&noun).len(), 2);
        assert_eq!(store.by_language_and_types("fr", &noun).len(), 1);
        assert!(store.by_language("es").is_empty());
    }

    #[test]
    fn test_non_persisted_entries_stay_in_memory() {
        let (mut store, _temp) = create_test_store();
        let dog = entry("dog", "fr", &["noun"], "chien");
        store.add(dog.clone(), false).unwrap();

        assert!(store.contains(dog.id()));
        assert!(matches!(
            store.load_entry(dog.id()),
            Err(StoreError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_categories_first_seen_order() {
        let (mut store, _temp) = create_test_store();
        store
            .add(entry("dog", "fr", &["noun"], "chien").with_categories(vec!["animals".into(), "basics".into()]), false)
            .unwrap();
        store
            .add(entry("cat", "fr", &["noun"], "chat").with_categories(vec!["basics".into(), "pets".into()]), false)
            .unwrap();

        assert_eq!(store.categories(), vec!["animals", "basics", "pets"]);
    }

    #[test]
    fn test_resolve_linked_sentences_skips_missing_and_duplicates() {
        let (mut store, _temp) = create_test_store();

        let mut base = entry("dog", "fr", &["noun"], "chien");
        let mut stored = entry("the dog sleeps", "fr", &["phrase"], "le chien dort");
        let mut missing = entry("the dog barks", "fr", &["phrase"], "le chien aboie");
        link_example_sentence(&mut base, &mut stored);
        link_example_sentence(&mut base, &mut missing);

        store.add(stored.clone(), true).unwrap();

        let sentences = store.resolve_linked_sentences(&base);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].id(), stored.id());
    }

    #[test]
    fn test_resolve_linked_sentences_reads_from_disk() {
        let (mut store, _temp) = create_test_store();

        let mut base = entry("dog", "fr", &["noun"], "chien");
        let mut sentence = entry("the dog sleeps", "fr", &["phrase"], "le chien dort");
        link_example_sentence(&mut base, &mut sentence);
        store.save_entry(&sentence).unwrap();

        assert!(!store.contains(sentence.id()));
        let sentences = store.resolve_linked_sentences(&base);
        assert_eq!(sentences, vec![sentence]);
    }
}
