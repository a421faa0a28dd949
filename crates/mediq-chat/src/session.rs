//! Conversation session lifecycle.
//!
//! A session owns one conversation for its lifetime. Sessions are created
//! empty, expire after a configurable idle timeout, and are torn down by
//! deletion; the conversation does not survive either.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mediq_core::types::Conversation;

/// One interactive session and its conversation.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub id: Uuid,
    /// Epoch seconds when the session was created.
    pub started_at: i64,
    /// Epoch seconds of the most recent message.
    pub last_message_at: i64,
    /// The session's exclusive conversation.
    pub conversation: Conversation,
    /// Number of user messages handled.
    pub message_count: u64,
}

/// Summary of a session for listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub started_at: String,
    pub last_message_at: String,
    pub message_count: u64,
}

/// Creates sessions and applies the idle-timeout policy.
pub struct SessionManager {
    /// Session timeout in minutes.
    pub session_timeout_minutes: u32,
}

impl SessionManager {
    pub fn new(session_timeout_minutes: u32) -> Self {
        Self {
            session_timeout_minutes,
        }
    }

    /// Create a fresh, empty session.
    pub fn create_session(&self) -> ConversationSession {
        let now = Local::now().timestamp();
        ConversationSession {
            id: Uuid::new_v4(),
            started_at: now,
            last_message_at: now,
            conversation: Conversation::new(),
            message_count: 0,
        }
    }

    /// Check whether a session has expired based on the configured timeout.
    pub fn is_expired(&self, session: &ConversationSession) -> bool {
        let now = Local::now().timestamp();
        let timeout_secs = i64::from(self.session_timeout_minutes) * 60;
        now - session.last_message_at > timeout_secs
    }

    /// Build a listing summary for a session.
    pub fn summarize(&self, session: &ConversationSession) -> SessionSummary {
        SessionSummary {
            id: session.id,
            started_at: format_epoch(session.started_at),
            last_message_at: format_epoch(session.last_message_at),
            message_count: session.message_count,
        }
    }
}

/// Format epoch seconds as ISO 8601 string.
fn format_epoch(epoch: i64) -> String {
    chrono::Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt: DateTime<Local>| dt.to_rfc3339())
        .unwrap_or_else(|| epoch.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager() -> SessionManager {
        SessionManager::new(30)
    }

    #[test]
    fn test_create_session_has_uuid() {
        let mgr = make_manager();
        let session = mgr.create_session();
        assert_ne!(session.id, Uuid::nil());
    }

    #[test]
    fn test_create_session_is_empty() {
        let mgr = make_manager();
        let session = mgr.create_session();
        assert!(session.conversation.is_empty());
        assert_eq!(session.message_count, 0);
    }

    #[test]
    fn test_create_session_timestamps() {
        let mgr = make_manager();
        let session = mgr.create_session();
        let now = Local::now().timestamp();
        assert!((session.started_at - now).abs() < 2);
        assert!((session.last_message_at - now).abs() < 2);
    }

    #[test]
    fn test_fresh_session_not_expired() {
        let mgr = make_manager();
        let session = mgr.create_session();
        assert!(!mgr.is_expired(&session));
    }

    #[test]
    fn test_idle_session_expires() {
        let mgr = make_manager();
        let mut session = mgr.create_session();
        session.last_message_at = Local::now().timestamp() - 60 * 60; // 1 hour ago
        assert!(mgr.is_expired(&session));
    }

    #[test]
    fn test_zero_timeout_expires_immediately_after_idle() {
        let mgr = SessionManager::new(0);
        let mut session = mgr.create_session();
        session.last_message_at = Local::now().timestamp() - 5;
        assert!(mgr.is_expired(&session));
    }

    #[test]
    fn test_summarize_fields() {
        let mgr = make_manager();
        let session = mgr.create_session();
        let summary = mgr.summarize(&session);
        assert_eq!(summary.id, session.id);
        assert!(!summary.started_at.is_empty());
        assert_eq!(summary.message_count, 0);
    }

    #[test]
    fn test_format_epoch_valid() {
        let s = format_epoch(1700000000);
        assert!(s.contains("2023")); // Nov 2023
    }
}
