//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use mediq_chat::ChatError;
use mediq_core::error::MediqError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 404 Not Found - resource does not exist.
    NotFound(String),
    /// 422 Unprocessable Entity - valid syntax but semantic validation failure.
    UnprocessableEntity(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 503 Service Unavailable - upstream model or service not reachable.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match &err {
            ChatError::EmptyMessage | ChatError::MessageTooLong(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ChatError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            ChatError::NothingPending => ApiError::UnprocessableEntity(err.to_string()),
            ChatError::ServiceError(msg) => ApiError::Internal(msg.clone()),
        }
    }
}

impl From<MediqError> for ApiError {
    fn from(err: MediqError) -> Self {
        match &err {
            MediqError::Answer(msg)
            | MediqError::Transcription(msg)
            | MediqError::Synthesis(msg) => ApiError::ServiceUnavailable(msg.clone()),
            MediqError::Extract(msg) => ApiError::UnprocessableEntity(msg.clone()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_chat_error_mapping() {
        assert!(matches!(
            ApiError::from(ChatError::EmptyMessage),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(ChatError::SessionNotFound(Uuid::new_v4())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(ChatError::ServiceError("down".to_string())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_mediq_error_mapping() {
        assert!(matches!(
            ApiError::from(MediqError::Transcription("whisper down".to_string())),
            ApiError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from(MediqError::Extract("no text".to_string())),
            ApiError::UnprocessableEntity(_)
        ));
        assert!(matches!(
            ApiError::from(MediqError::Config("bad".to_string())),
            ApiError::Internal(_)
        ));
    }
}
