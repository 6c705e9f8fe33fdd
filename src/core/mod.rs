//! Core module containing the vocabulary model, validation, authentication
//! and the storage gateway trait

pub mod auth;
pub mod error;
pub mod guard;
pub mod service;
pub mod validation;
pub mod vocabulary;

pub use auth::{Authenticator, Claims, Credentials, IssuedToken, Principal, TokenCodec};
pub use error::{
    AuthError, ConfigError, EntryError, ErrorResponse, RequestError, StorageError,
    ValidationError, VocabError, VocabResult,
};
pub use guard::{AccessGuard, RequireApiKey, RequireToken, RevocationList};
pub use service::{VocabularyService, WordUniqueness};
pub use validation::{RecordConverter, ValidatedEntry};
pub use vocabulary::{
    ExportRow, GrammaticalMarker, Language, Level, MarkerSet, NewVocabulary, RawRecord,
    VocabularyEntry, VocabularyPayload, WordType,
};
