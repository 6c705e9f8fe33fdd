//! HTTP handlers
//!
//! Guards run as extractors before any body is read, so an unauthenticated
//! write is rejected before validation.

pub mod auth;
pub mod vocabulary;

use axum::Json;
use serde_json::{Value, json};

use crate::core::error::ValidationError;
use crate::core::vocabulary::Language;

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tomostudy"
    }))
}

pub(crate) fn parse_language(raw: Option<&str>) -> Result<Language, ValidationError> {
    raw.and_then(Language::parse)
        .ok_or(ValidationError::InvalidLanguage)
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::field("vocab_id", "must be an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language(Some("jp")), Ok(Language::Jp));
        assert_eq!(parse_language(Some("en")), Err(ValidationError::InvalidLanguage));
        assert_eq!(parse_language(None), Err(ValidationError::InvalidLanguage));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12"), Ok(12));
        assert!(parse_id("twelve").is_err());
    }
}
