//! Mediq API crate - axum HTTP server and route handlers.
//!
//! Provides the REST API for the Mediq assistant: question answering,
//! session-scoped chat (text and voice), medical image analysis, PDF
//! report extraction, session management, and health checks.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
