//! Application state shared across handlers

use axum::extract::FromRef;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::auth::{Authenticator, Credentials, TokenCodec};
use crate::core::guard::AccessGuard;
use crate::core::service::VocabularyService;
use crate::core::validation::RecordConverter;

#[derive(Clone)]
pub struct AppState {
    pub vocabulary: Arc<dyn VocabularyService>,
    pub converter: RecordConverter,
    pub authenticator: Arc<Authenticator>,
    pub guard: Arc<AccessGuard>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the components from an already validated configuration
    pub fn new(config: AppConfig, vocabulary: Arc<dyn VocabularyService>) -> Self {
        let tokens = TokenCodec::new(config.secret_key.as_bytes().to_vec(), config.token_ttl());
        let authenticator = Authenticator::new(
            Credentials {
                username: config.username.clone(),
                password_hash: config.password_hash.clone(),
            },
            tokens.clone(),
        );
        let guard = AccessGuard::new(tokens, config.api_key.clone());

        Self {
            vocabulary,
            converter: RecordConverter::new(config.marker_values),
            authenticator: Arc::new(authenticator),
            guard: Arc::new(guard),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for RecordConverter {
    fn from_ref(state: &AppState) -> Self {
        state.converter
    }
}

impl FromRef<AppState> for Arc<AccessGuard> {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}
