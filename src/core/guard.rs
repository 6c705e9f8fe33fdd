//! Access guards for incoming requests
//!
//! Two independent gates:
//! - token guard: verifies the `access_token` cookie and yields the [`Principal`]
//! - API-key guard: compares the `x-api-key` header to the configured key
//!
//! Guards only read state. Revoking a token on logout is a separate call on
//! the [`RevocationList`].

use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::core::auth::{Principal, TokenCodec, constant_time_eq};
use crate::core::error::{AuthError, VocabError};

/// Cookie slot carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Server-side denylist of token ids.
///
/// Entries are dropped once the token would have expired anyway.
#[derive(Debug, Clone, Default)]
pub struct RevocationList {
    revoked: Arc<RwLock<HashMap<Uuid, i64>>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, token_id: Uuid, expires_at: i64, now: DateTime<Utc>) {
        let mut revoked = self.revoked.write().unwrap_or_else(PoisonError::into_inner);
        let now = now.timestamp();
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(token_id, expires_at);
    }

    pub fn is_revoked(&self, token_id: &Uuid) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(token_id)
    }

    pub fn len(&self) -> usize {
        self.revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Token and API-key checks
#[derive(Debug, Clone)]
pub struct AccessGuard {
    tokens: TokenCodec,
    api_key: String,
    revocations: RevocationList,
}

impl AccessGuard {
    pub fn new(tokens: TokenCodec, api_key: impl Into<String>) -> Self {
        Self {
            tokens,
            api_key: api_key.into(),
            revocations: RevocationList::new(),
        }
    }

    pub fn revocations(&self) -> &RevocationList {
        &self.revocations
    }

    /// Verify a presented token. Expired, forged, malformed and revoked
    /// tokens all fail closed.
    pub fn check_token(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let claims = self.tokens.verify(token, now)?;
        if self.revocations.is_revoked(&claims.jti) {
            return Err(AuthError::RevokedToken);
        }
        Ok(claims.into())
    }

    /// Constant-time comparison against the configured key
    pub fn check_api_key(&self, key: Option<&str>) -> Result<(), AuthError> {
        let key = key.ok_or(AuthError::MissingApiKey)?;
        if constant_time_eq(self.api_key.as_bytes(), key.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }

    /// Revoke a still-valid token; returns whether anything was revoked
    pub fn revoke(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.tokens.verify(token, now) {
            Ok(claims) => {
                self.revocations.revoke(claims.jti, claims.exp, now);
                true
            }
            Err(_) => false,
        }
    }
}

/// Read a cookie value from the request headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Extractor that requires a valid access token cookie
#[derive(Debug, Clone)]
pub struct RequireToken(pub Principal);

impl<S> FromRequestParts<S> for RequireToken
where
    S: Send + Sync,
    Arc<AccessGuard>: FromRef<S>,
{
    type Rejection = VocabError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = Arc::<AccessGuard>::from_ref(state);
        let token = cookie_value(&parts.headers, ACCESS_TOKEN_COOKIE);
        let principal = guard.check_token(token.as_deref(), Utc::now())?;
        Ok(RequireToken(principal))
    }
}

/// Extractor that requires the configured API key header
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
    Arc<AccessGuard>: FromRef<S>,
{
    type Rejection = VocabError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = Arc::<AccessGuard>::from_ref(state);
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        guard.check_api_key(key)?;
        Ok(RequireApiKey)
    }
}
