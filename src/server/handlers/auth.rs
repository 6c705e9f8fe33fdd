//! Login, logout and session check

use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::{
        HeaderMap,
        header::{CONTENT_TYPE, SET_COOKIE},
    },
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::core::error::{RequestError, VocabError, VocabResult};
use crate::core::guard::{ACCESS_TOKEN_COOKIE, RequireToken, cookie_value};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login body, accepted as a URL-encoded form or as JSON
#[derive(Debug)]
pub struct LoginRequest(pub LoginForm);

impl<S> FromRequest<S> for LoginRequest
where
    S: Send + Sync,
{
    type Rejection = VocabError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let form = if is_json {
            Json::<LoginForm>::from_request(req, state)
                .await
                .map_err(|rejection| RequestError::InvalidBody {
                    message: rejection.body_text(),
                })?
                .0
        } else {
            Form::<LoginForm>::from_request(req, state)
                .await
                .map_err(|rejection| RequestError::InvalidBody {
                    message: rejection.body_text(),
                })?
                .0
        };
        Ok(LoginRequest(form))
    }
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{ACCESS_TOKEN_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age_secs}{secure}"
    )
}

pub async fn login(
    State(state): State<AppState>,
    LoginRequest(form): LoginRequest,
) -> VocabResult<impl IntoResponse> {
    let issued = state
        .authenticator
        .authenticate(&form.username, &form.password, Utc::now())
        .inspect_err(|_| tracing::warn!("login rejected"))?;

    tracing::info!(token_id = %issued.claims.jti, "login succeeded");

    let cookie = session_cookie(
        &issued.token,
        state.authenticator.tokens().ttl().num_seconds(),
        state.config.secure_cookies(),
    );
    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({ "expires_at": issued.claims.exp })),
    ))
}

/// Clear the session cookie and, when enabled, revoke the token
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if state.config.revoke_on_logout {
        if let Some(token) = cookie_value(&headers, ACCESS_TOKEN_COOKIE) {
            if state.guard.revoke(&token, Utc::now()) {
                tracing::info!("token revoked on logout");
            }
        }
    }

    [(
        SET_COOKIE,
        session_cookie("", 0, state.config.secure_cookies()),
    )]
}

pub async fn auth_check(RequireToken(principal): RequireToken) -> impl IntoResponse {
    Json(json!({
        "username": principal.username,
        "expires_at": principal.expires_at,
    }))
}
