//! # Tomostudy
//!
//! Vocabulary management backend for language learners.
//!
//! ## Features
//!
//! - **Validated Writes**: every create, update and import passes the record
//!   converter (enum whitelists, length rules, markup stripping)
//! - **Token Sessions**: HMAC-signed, time-limited tokens in an HttpOnly
//!   cookie, with server-side revocation on logout
//! - **API-Key Reads**: read endpoints gated by a static key compared in
//!   constant time
//! - **Bulk Import / Export**: atomic or partial JSON imports, per-language
//!   JSON export
//! - **Configuration-Based**: YAML file or environment variables
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tomostudy::prelude::*;
//!
//! let config = AppConfig::from_yaml_file("tomostudy.yaml")?;
//! ServerBuilder::new(config)
//!     .with_vocabulary_service(InMemoryVocabularyService::new())
//!     .serve()
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod observability;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{Authenticator, Claims, Credentials, Principal, TokenCodec, hash_password},
        error::{AuthError, EntryError, ValidationError, VocabError, VocabResult},
        guard::{AccessGuard, RequireApiKey, RequireToken},
        service::{VocabularyService, WordUniqueness},
        validation::{RecordConverter, ValidatedEntry, sanitize, sanitize_all},
        vocabulary::{
            ExportRow, GrammaticalMarker, Language, Level, MarkerSet, NewVocabulary, RawRecord,
            VocabularyEntry, VocabularyPayload, WordType,
        },
    };

    // === Storage ===
    pub use crate::storage::InMemoryVocabularyService;

    // === Config ===
    pub use crate::config::{AppConfig, Environment, ImportPolicy};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder, build_router};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
}
