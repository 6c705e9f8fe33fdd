//! Tracing subscriber setup
//!
//! Pretty output in development, JSON lines in production. `RUST_LOG`
//! overrides the default filter.

use crate::config::Environment;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_FILTER: &str = "tomostudy=info,tower_http=info";

pub fn init_tracing(environment: Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match environment {
        Environment::Development => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        Environment::Production => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    // a subscriber may already be installed by tests
    if let Err(err) = result {
        tracing::debug!(error = %err, "tracing subscriber already initialized");
    }
}
