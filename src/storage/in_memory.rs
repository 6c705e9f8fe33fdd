//! In-memory implementation of VocabularyService for testing and development

use crate::core::error::{EntryError, StorageError, VocabResult};
use crate::core::service::{MAX_QUERY_LEN, VocabularyService, WordUniqueness};
use crate::core::vocabulary::{Language, NewVocabulary, VocabularyEntry};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct Store {
    entries: BTreeMap<i64, VocabularyEntry>,
    last_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory vocabulary store
///
/// Uses RwLock for thread-safe access. Ids increase monotonically and are
/// never handed out twice, even after a delete.
#[derive(Debug, Clone)]
pub struct InMemoryVocabularyService {
    store: Arc<RwLock<Store>>,
    uniqueness: WordUniqueness,
}

impl InMemoryVocabularyService {
    /// Create an empty store with per-language word uniqueness
    pub fn new() -> Self {
        Self::with_uniqueness(WordUniqueness::default())
    }

    pub fn with_uniqueness(uniqueness: WordUniqueness) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store {
                entries: BTreeMap::new(),
                last_id: 0,
            })),
            uniqueness,
        }
    }

    pub fn uniqueness(&self) -> WordUniqueness {
        self.uniqueness
    }

    fn ensure_unique<'a>(
        &self,
        existing: impl IntoIterator<Item = (&'a str, Language)>,
        candidate: &NewVocabulary,
    ) -> Result<(), EntryError> {
        let candidate_key = (candidate.word.as_str(), candidate.language);
        if existing
            .into_iter()
            .any(|key| self.uniqueness.collides(key, candidate_key))
        {
            return Err(EntryError::Conflict {
                word: candidate.word.clone(),
                language: candidate.language.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryVocabularyService {
    fn default() -> Self {
        Self::new()
    }
}

fn stored_keys<'a>(
    entries: &'a BTreeMap<i64, VocabularyEntry>,
    skip: Option<i64>,
) -> impl Iterator<Item = (&'a str, Language)> + 'a {
    entries
        .values()
        .filter(move |entry| Some(entry.vocab_id) != skip)
        .map(|entry| (entry.word.as_str(), entry.language))
}

#[async_trait]
impl VocabularyService for InMemoryVocabularyService {
    async fn create(&self, entry: NewVocabulary) -> VocabResult<VocabularyEntry> {
        let mut store = self
            .store
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        self.ensure_unique(stored_keys(&store.entries, None), &entry)?;

        let id = store.next_id();
        let created = VocabularyEntry::from_new(id, entry);
        store.entries.insert(id, created.clone());

        Ok(created)
    }

    async fn create_batch(&self, entries: Vec<NewVocabulary>) -> VocabResult<Vec<VocabularyEntry>> {
        let mut store = self
            .store
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        for (index, entry) in entries.iter().enumerate() {
            let earlier = entries[..index]
                .iter()
                .map(|e| (e.word.as_str(), e.language));
            self.ensure_unique(stored_keys(&store.entries, None).chain(earlier), entry)?;
        }

        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = store.next_id();
            let stored = VocabularyEntry::from_new(id, entry);
            store.entries.insert(id, stored.clone());
            created.push(stored);
        }

        Ok(created)
    }

    async fn get(&self, id: i64) -> VocabResult<Option<VocabularyEntry>> {
        let store = self
            .store
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        Ok(store.entries.get(&id).cloned())
    }

    async fn find_by_language(
        &self,
        language: Language,
        query: Option<&str>,
    ) -> VocabResult<Vec<VocabularyEntry>> {
        let store = self
            .store
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let in_language = store
            .entries
            .values()
            .filter(|entry| entry.language == language);

        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Ok(in_language.cloned().collect());
        };
        if query.chars().count() > MAX_QUERY_LEN {
            return Ok(Vec::new());
        }

        let needle = query.to_lowercase();
        let mut matches: Vec<VocabularyEntry> = in_language
            .filter(|entry| entry.word.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.word.cmp(&b.word).then(a.vocab_id.cmp(&b.vocab_id)));

        Ok(matches)
    }

    async fn find_by_slug(
        &self,
        language: Language,
        word: &str,
    ) -> VocabResult<Option<VocabularyEntry>> {
        let store = self
            .store
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        Ok(store
            .entries
            .values()
            .find(|entry| entry.language == language && entry.word == word)
            .cloned())
    }

    async fn update(&self, id: i64, entry: NewVocabulary) -> VocabResult<Option<VocabularyEntry>> {
        let mut store = self
            .store
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        if !store.entries.contains_key(&id) {
            return Ok(None);
        }
        self.ensure_unique(stored_keys(&store.entries, Some(id)), &entry)?;

        let Some(existing) = store.entries.get_mut(&id) else {
            return Ok(None);
        };
        existing.replace_with(entry);

        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i64) -> VocabResult<bool> {
        let mut store = self
            .store
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        Ok(store.entries.remove(&id).is_some())
    }

    async fn count(&self) -> VocabResult<usize> {
        let store = self
            .store
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        Ok(store.entries.len())
    }
}
