//! Error types for the conversation manager.

use mediq_core::error::MediqError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("conversation has no pending user turn")]
    NothingPending,
    #[error("service error: {0}")]
    ServiceError(String),
}

impl From<MediqError> for ChatError {
    fn from(err: MediqError) -> Self {
        ChatError::ServiceError(err.to_string())
    }
}
