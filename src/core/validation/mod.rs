//! Validation and sanitization of vocabulary input
//!
//! Field validators whitelist the enumerated fields, the sanitizer strips
//! markup from free text and the converter combines both into the single
//! gate every write path passes through.

pub mod converter;
pub mod extractor;
pub mod sanitizer;
pub mod validators;

pub use converter::RecordConverter;
pub use extractor::ValidatedEntry;
pub use sanitizer::{sanitize, sanitize_all};
