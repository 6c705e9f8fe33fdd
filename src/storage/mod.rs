//! Storage implementations of the vocabulary gateway

pub mod in_memory;

pub use in_memory::InMemoryVocabularyService;
