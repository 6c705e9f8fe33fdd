//! HTTP server for the vocabulary API
//!
//! This module provides:
//! - `ServerBuilder` that validates configuration and wires the state
//! - the route table with tracing and CORS layers
//! - handlers for authentication, vocabulary CRUD, import and export

pub mod builder;
pub mod handlers;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_router;
pub use state::AppState;
