//! Storage gateway trait for vocabulary entries

use crate::core::error::VocabResult;
use crate::core::vocabulary::{Language, NewVocabulary, VocabularyEntry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Queries longer than this never match anything
pub const MAX_QUERY_LEN: usize = 100;

/// Scope in which a word must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordUniqueness {
    /// A word may exist once across all languages
    Global,
    /// A word may exist once per language
    #[default]
    PerLanguage,
    /// No uniqueness rule
    None,
}

impl WordUniqueness {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "global" => Some(WordUniqueness::Global),
            "per_language" => Some(WordUniqueness::PerLanguage),
            "none" => Some(WordUniqueness::None),
            _ => None,
        }
    }

    /// Whether `candidate` clashes with an existing `(word, language)`
    pub fn collides(
        &self,
        existing: (&str, Language),
        candidate: (&str, Language),
    ) -> bool {
        match self {
            WordUniqueness::Global => existing.0 == candidate.0,
            WordUniqueness::PerLanguage => existing == candidate,
            WordUniqueness::None => false,
        }
    }
}

/// Service trait for persisting vocabulary entries
///
/// Implementations assign ids, enforce the configured uniqueness scope and
/// never see unconverted input: every [`NewVocabulary`] has already passed
/// the record converter.
#[async_trait]
pub trait VocabularyService: Send + Sync {
    /// Store one entry and assign it an id
    async fn create(&self, entry: NewVocabulary) -> VocabResult<VocabularyEntry>;

    /// Store several entries; either all of them are stored or none
    async fn create_batch(&self, entries: Vec<NewVocabulary>) -> VocabResult<Vec<VocabularyEntry>>;

    /// Get an entry by id
    async fn get(&self, id: i64) -> VocabResult<Option<VocabularyEntry>>;

    /// List entries of a language, optionally filtered by a word query
    ///
    /// With a query the match is a case-insensitive substring on `word`,
    /// ordered by word. Without one, entries come back in id order.
    async fn find_by_language(
        &self,
        language: Language,
        query: Option<&str>,
    ) -> VocabResult<Vec<VocabularyEntry>>;

    /// Get an entry by its exact word within a language
    async fn find_by_slug(
        &self,
        language: Language,
        word: &str,
    ) -> VocabResult<Option<VocabularyEntry>>;

    /// Replace every field of an entry; `None` when the id is unknown
    async fn update(&self, id: i64, entry: NewVocabulary) -> VocabResult<Option<VocabularyEntry>>;

    /// Delete an entry; returns whether anything was removed
    async fn delete(&self, id: i64) -> VocabResult<bool>;

    /// Number of stored entries
    async fn count(&self) -> VocabResult<usize>;
}
