//! Application state shared across all route handlers.
//!
//! AppState holds the orchestrator and the services that sit outside the
//! per-turn pipeline (transcription and image analysis). It is generic over
//! the service implementations so tests can run the full router against
//! mocks while production wires the HTTP-backed clients.

use std::sync::Arc;
use std::time::Instant;

use mediq_chat::ChatOrchestrator;
use mediq_core::config::MediqConfig;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
pub struct AppState<A, E, T, S, V, I> {
    /// The conversational engine and session store.
    pub orchestrator: Arc<ChatOrchestrator<A, E, T, S>>,
    /// Speech-to-text service for voice input.
    pub transcription: Arc<V>,
    /// Medical image analysis service.
    pub image_analyzer: Arc<I>,
    /// Application configuration.
    pub config: Arc<MediqConfig>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

// Derived Clone would require Clone on the service types themselves.
impl<A, E, T, S, V, I> Clone for AppState<A, E, T, S, V, I> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            transcription: Arc::clone(&self.transcription),
            image_analyzer: Arc::clone(&self.image_analyzer),
            config: Arc::clone(&self.config),
            start_time: self.start_time,
        }
    }
}

impl<A, E, T, S, V, I> AppState<A, E, T, S, V, I> {
    /// Create a new AppState with the given components.
    pub fn new(
        config: MediqConfig,
        orchestrator: ChatOrchestrator<A, E, T, S>,
        transcription: V,
        image_analyzer: I,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            transcription: Arc::new(transcription),
            image_analyzer: Arc::new(image_analyzer),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}
