//! Typed error handling for the vocabulary backend
//!
//! Every failure that can reach the HTTP boundary is one of the categories
//! below. Each category knows its status code and a stable error code, and
//! [`VocabError`] renders itself as a JSON body.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: rejected or malformed input (400)
//! - [`AuthError`]: bad credentials, missing/invalid/expired token, bad API key (401/403)
//! - [`EntryError`]: unknown entry or uniqueness conflict (404/409)
//! - [`RequestError`]: transport-level problems (415, 400, 403)
//! - [`StorageError`]: storage gateway failures (500)
//!
//! [`ConfigError`] is separate: it stops the server from starting and never
//! reaches a client.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Message shown to clients for every token failure
const TOKEN_CLIENT_MESSAGE: &str = "Could not validate credentials";

/// The main error type
#[derive(Debug, Error)]
pub enum VocabError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl VocabError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VocabError::Validation(_) => StatusCode::BAD_REQUEST,
            VocabError::Auth(e) => e.status_code(),
            VocabError::Entry(e) => e.status_code(),
            VocabError::Request(e) => e.status_code(),
            VocabError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            VocabError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            VocabError::Validation(_) => "VALIDATION_ERROR",
            VocabError::Auth(e) => e.error_code(),
            VocabError::Entry(e) => e.error_code(),
            VocabError::Request(e) => e.error_code(),
            VocabError::Storage(_) => "STORAGE_ERROR",
            VocabError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to send to the client.
    ///
    /// Authentication failures collapse to a fixed message, server-side
    /// failures never echo their internal detail.
    pub fn client_message(&self) -> String {
        match self {
            VocabError::Auth(e) => e.client_message().to_string(),
            VocabError::Storage(_) | VocabError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.client_message(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            VocabError::Validation(ValidationError::FieldError { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            VocabError::Entry(EntryError::NotFound { id: Some(id) }) => {
                Some(serde_json::json!({ "vocab_id": id }))
            }
            VocabError::Entry(EntryError::Conflict { word, language }) => {
                Some(serde_json::json!({ "word": word, "language": language }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for VocabError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), "request rejected");
        }

        let challenge = matches!(&self, VocabError::Auth(e) if e.is_token_failure());
        let mut response = (status, Json(self.to_response())).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Rejected input. Client fault, not retryable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// First field that failed a check
    #[error("Invalid value for field '{field}': {message}")]
    FieldError { field: String, message: String },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Invalid language")]
    InvalidLanguage,
}

impl ValidationError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Authentication Errors
// =============================================================================

/// Credential, token and API-key failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong username or wrong password; deliberately indistinguishable
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("missing access token")]
    MissingToken,

    #[error("malformed or forged access token")]
    InvalidToken,

    #[error("access token expired")]
    ExpiredToken,

    #[error("access token revoked")]
    RevokedToken,

    #[error("missing API key")]
    MissingApiKey,

    #[error("invalid API key")]
    InvalidApiKey,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidApiKey => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::RevokedToken => "UNAUTHORIZED",
            AuthError::MissingApiKey => "MISSING_API_KEY",
            AuthError::InvalidApiKey => "FORBIDDEN",
        }
    }

    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::ExpiredToken
                | AuthError::RevokedToken
        )
    }

    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Incorrect username or password",
            AuthError::MissingApiKey | AuthError::InvalidApiKey => "Access denied",
            _ => TOKEN_CLIENT_MESSAGE,
        }
    }
}

// =============================================================================
// Entry Errors
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EntryError {
    /// `id` is absent for lookups by slug
    #[error("Not found")]
    NotFound { id: Option<i64> },

    #[error("'{word}' already exists for language '{language}'")]
    Conflict { word: String, language: String },
}

impl EntryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntryError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntryError::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntryError::NotFound { .. } => "NOT_FOUND",
            EntryError::Conflict { .. } => "CONFLICT",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    #[error("Invalid file type {content_type}. Please add a JSON file")]
    UnsupportedMediaType { content_type: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("Access denied")]
    Forbidden,
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::Forbidden => "FORBIDDEN",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error("storage lock poisoned: {0}")]
    LockPoisoned(String),
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("Missing required setting '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for VocabError {
    fn from(err: serde_json::Error) -> Self {
        VocabError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

/// Result alias used across the crate
pub type VocabResult<T> = Result<T, VocabError>;
