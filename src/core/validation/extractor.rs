//! Axum extractor for converted vocabulary entries
//!
//! This module provides the `ValidatedEntry` extractor that runs the record
//! converter on a JSON body before the handler sees it.

use super::converter::RecordConverter;
use crate::core::error::{RequestError, ValidationError, VocabError};
use crate::core::vocabulary::{NewVocabulary, VocabularyPayload};
use axum::{
    Json,
    extract::{FromRef, FromRequest, Request, rejection::JsonRejection},
    http::header::CONTENT_TYPE,
};

/// A request body that has passed validation and sanitization
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_vocabulary(
///     State(state): State<AppState>,
///     ValidatedEntry(entry): ValidatedEntry,
/// ) -> VocabResult<Json<VocabularyEntry>> {
///     // entry is already whitelisted and free of markup
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedEntry(pub NewVocabulary);

impl<S> FromRequest<S> for ValidatedEntry
where
    S: Send + Sync,
    RecordConverter: FromRef<S>,
{
    type Rejection = VocabError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let Json(payload) = Json::<VocabularyPayload>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::MissingJsonContentType(_) => {
                    VocabError::from(RequestError::UnsupportedMediaType { content_type })
                }
                other => VocabError::from(ValidationError::InvalidJson {
                    message: other.body_text(),
                }),
            })?;

        let converter = RecordConverter::from_ref(state);
        Ok(ValidatedEntry(converter.to_record(payload)?))
    }
}
