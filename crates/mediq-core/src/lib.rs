//! MedIQ core crate - shared configuration, errors, and domain types.
//!
//! Every other MedIQ crate depends on this one for the top-level error
//! type, the TOML configuration loader, and the conversation domain model.

pub mod config;
pub mod error;
pub mod types;

pub use config::MediqConfig;
pub use error::{MediqError, Result};
pub use types::{AnswerRequest, Conversation, Role, Tone, Turn};
