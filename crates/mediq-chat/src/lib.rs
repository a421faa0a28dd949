//! Conversational engine for Mediq.
//!
//! Owns session lifecycle and conversation state, and coordinates the
//! per-turn pipeline: greeting detection, bounded-context construction,
//! answer generation, entity highlighting, translation, and speech
//! synthesis.

pub mod context;
pub mod error;
pub mod greeting;
pub mod orchestrator;
pub mod session;

pub use context::build_context;
pub use error::ChatError;
pub use greeting::{canned_greeting, is_greeting};
pub use orchestrator::{ChatOrchestrator, SubmitOutcome, TurnOptions, UserInput};
pub use session::{ConversationSession, SessionManager, SessionSummary};
