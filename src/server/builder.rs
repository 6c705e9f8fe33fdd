//! ServerBuilder for fluent API to build HTTP servers

use super::router::build_router;
use super::state::AppState;
use crate::config::AppConfig;
use crate::core::error::ConfigError;
use crate::core::service::VocabularyService;
use crate::storage::InMemoryVocabularyService;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating the HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new(AppConfig::from_env()?)
///     .with_vocabulary_service(InMemoryVocabularyService::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    vocabulary: Option<Arc<dyn VocabularyService>>,
}

impl ServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            vocabulary: None,
        }
    }

    /// Set the storage gateway
    ///
    /// Defaults to an in-memory store honouring the configured word
    /// uniqueness scope.
    pub fn with_vocabulary_service(mut self, service: impl VocabularyService + 'static) -> Self {
        self.vocabulary = Some(Arc::new(service));
        self
    }

    /// Validate the configuration and wire the shared state
    pub fn build_state(self) -> Result<AppState, ConfigError> {
        self.config.validate()?;

        let vocabulary = self.vocabulary.unwrap_or_else(|| {
            Arc::new(InMemoryVocabularyService::with_uniqueness(
                self.config.word_uniqueness,
            ))
        });

        Ok(AppState::new(self.config, vocabulary))
    }

    /// Build the final router
    pub fn build(self) -> Result<Router, ConfigError> {
        Ok(build_router(self.build_state()?))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr.clone();
        let environment = self.config.environment;
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(address = %addr, ?environment, "server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
