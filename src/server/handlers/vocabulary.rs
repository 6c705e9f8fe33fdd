//! Vocabulary CRUD, bulk import and export

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_id, parse_language};
use crate::config::ImportPolicy;
use crate::core::error::{
    EntryError, RequestError, ValidationError, VocabError, VocabResult,
};
use crate::core::guard::{RequireApiKey, RequireToken};
use crate::core::validation::ValidatedEntry;
use crate::core::vocabulary::{ExportRow, NewVocabulary, VocabularyEntry};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub lang: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// One import item that did not make it into storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedItem {
    pub index: usize,
    pub message: String,
}

/// Result of a bulk import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub created: Vec<i64>,
    pub rejected: Vec<RejectedItem>,
}

pub async fn list_vocabulary(
    State(state): State<AppState>,
    _: RequireApiKey,
    Query(params): Query<ListQuery>,
) -> VocabResult<Json<Vec<VocabularyEntry>>> {
    let language = parse_language(params.lang.as_deref())?;
    let entries = state
        .vocabulary
        .find_by_language(language, params.query.as_deref())
        .await?;
    Ok(Json(entries))
}

pub async fn get_vocabulary(
    State(state): State<AppState>,
    _: RequireApiKey,
    Path(id): Path<String>,
) -> VocabResult<Json<VocabularyEntry>> {
    let id = parse_id(&id)?;
    let entry = state
        .vocabulary
        .get(id)
        .await?
        .ok_or(EntryError::NotFound { id: Some(id) })?;
    Ok(Json(entry))
}

pub async fn get_vocabulary_by_slug(
    State(state): State<AppState>,
    _: RequireApiKey,
    Path(slug): Path<String>,
    Query(params): Query<LangQuery>,
) -> VocabResult<Json<VocabularyEntry>> {
    let language = parse_language(params.lang.as_deref())?;
    let entry = state
        .vocabulary
        .find_by_slug(language, &slug)
        .await?
        .ok_or(EntryError::NotFound { id: None })?;
    Ok(Json(entry))
}

pub async fn create_vocabulary(
    State(state): State<AppState>,
    RequireToken(principal): RequireToken,
    ValidatedEntry(entry): ValidatedEntry,
) -> VocabResult<impl IntoResponse> {
    let created = state.vocabulary.create(entry).await?;
    tracing::info!(
        user = %principal.username,
        vocab_id = created.vocab_id,
        language = %created.language,
        "vocabulary created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_vocabulary(
    State(state): State<AppState>,
    RequireToken(principal): RequireToken,
    Path(id): Path<String>,
    ValidatedEntry(entry): ValidatedEntry,
) -> VocabResult<Json<VocabularyEntry>> {
    let id = parse_id(&id)?;
    let updated = state
        .vocabulary
        .update(id, entry)
        .await?
        .ok_or(EntryError::NotFound { id: Some(id) })?;
    tracing::info!(user = %principal.username, vocab_id = id, "vocabulary updated");
    Ok(Json(updated))
}

/// 200 when something was removed, 204 when the id was already absent
pub async fn delete_vocabulary(
    State(state): State<AppState>,
    RequireToken(principal): RequireToken,
    Path(id): Path<String>,
) -> VocabResult<StatusCode> {
    let id = parse_id(&id)?;
    if state.vocabulary.delete(id).await? {
        tracing::info!(user = %principal.username, vocab_id = id, "vocabulary deleted");
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

pub async fn import_vocabulary(
    State(state): State<AppState>,
    RequireToken(principal): RequireToken,
    headers: HeaderMap,
    body: Bytes,
) -> VocabResult<Json<ImportReport>> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("application/json") {
        return Err(RequestError::UnsupportedMediaType {
            content_type: content_type.to_string(),
        }
        .into());
    }

    let Value::Array(items) =
        serde_json::from_slice::<Value>(&body).map_err(|e| RequestError::InvalidBody {
            message: e.to_string(),
        })?
    else {
        return Err(RequestError::InvalidBody {
            message: "expected a JSON array".to_string(),
        }
        .into());
    };

    let total = items.len();
    let report = match state.config.import_policy {
        ImportPolicy::Atomic => import_atomic(&state, items).await?,
        ImportPolicy::Partial => import_partial(&state, items).await?,
    };

    tracing::info!(
        user = %principal.username,
        total,
        created = report.created.len(),
        rejected = report.rejected.len(),
        "vocabulary import finished"
    );
    Ok(Json(report))
}

fn convert_item(
    state: &AppState,
    index: usize,
    item: Value,
) -> Result<NewVocabulary, ValidationError> {
    let result = match item {
        Value::Object(map) => state.converter.to_record(map),
        _ => Err(ValidationError::field("record", "must be an object")),
    };
    result.map_err(|err| match err {
        ValidationError::FieldError { field, message } => {
            ValidationError::field(&format!("[{index}].{field}"), message)
        }
        other => other,
    })
}

async fn import_atomic(state: &AppState, items: Vec<Value>) -> VocabResult<ImportReport> {
    let entries = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| convert_item(state, index, item))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|err| tracing::warn!(error = %err, "import aborted"))?;

    let created = state.vocabulary.create_batch(entries).await?;
    Ok(ImportReport {
        created: created.into_iter().map(|e| e.vocab_id).collect(),
        rejected: Vec::new(),
    })
}

async fn import_partial(state: &AppState, items: Vec<Value>) -> VocabResult<ImportReport> {
    let mut report = ImportReport {
        created: Vec::new(),
        rejected: Vec::new(),
    };

    for (index, item) in items.into_iter().enumerate() {
        let entry = match convert_item(state, index, item) {
            Ok(entry) => entry,
            Err(err) => {
                report.rejected.push(RejectedItem {
                    index,
                    message: err.to_string(),
                });
                continue;
            }
        };
        match state.vocabulary.create(entry).await {
            Ok(created) => report.created.push(created.vocab_id),
            Err(err @ VocabError::Entry(EntryError::Conflict { .. })) => {
                report.rejected.push(RejectedItem {
                    index,
                    message: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}

pub async fn export_vocabulary(
    State(state): State<AppState>,
    _: RequireToken,
    Query(params): Query<LangQuery>,
) -> VocabResult<impl IntoResponse> {
    if !state.config.export_allowed() {
        return Err(RequestError::Forbidden.into());
    }
    let language = parse_language(params.lang.as_deref())?;

    let rows: Vec<ExportRow> = state
        .vocabulary
        .find_by_language(language, None)
        .await?
        .into_iter()
        .map(ExportRow::from)
        .collect();
    let body = serde_json::to_vec(&rows).map_err(|e| VocabError::Internal(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, "application/json".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{language}.json\""),
            ),
        ],
        body,
    ))
}
