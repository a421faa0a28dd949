//! Chat orchestrator: central coordinator for the conversation pipeline.
//!
//! Decides per turn whether the input is a greeting, an image or PDF
//! result, or a substantive question; builds the bounded context; invokes
//! the answer service; post-processes the answer through highlighting and
//! translation; and appends the result. Typed and voice-transcribed input
//! flow through the same path, so the two can never diverge.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Local;
use uuid::Uuid;

use mediq_answer::AnswerService;
use mediq_core::config::ChatSettings;
use mediq_core::types::{AnswerRequest, Tone, Turn};
use mediq_highlight::{highlight, EntityTagger};
use mediq_speech::{clean_for_synthesis, SynthesisService};
use mediq_translate::Translator;

use crate::context::build_context;
use crate::error::ChatError;
use crate::greeting::{canned_greeting, is_greeting};
use crate::session::{ConversationSession, SessionManager, SessionSummary};

/// Fallback reply when the answer service fails or returns nothing usable.
const NO_RESPONSE: &str = "No response";

/// Characters of extracted PDF text shown in the conversation.
const PDF_PREVIEW_CHARS: usize = 800;

/// One unit of user input entering the conversation.
#[derive(Debug, Clone)]
pub enum UserInput {
    /// Typed text.
    Text(String),
    /// Transcribed speech, handled identically to typed text.
    Speech(String),
    /// Result of image analysis; appended directly as an assistant turn.
    ImageAnalysis(String),
    /// Extracted PDF text; appended directly as an assistant turn.
    PdfText(String),
}

/// Per-turn preferences.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    /// Output language code (2-letter).
    pub language: String,
    /// Requested answer tone.
    pub tone: Tone,
    /// Whether to request a simplified explanation.
    pub simplify: bool,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            tone: Tone::Formal,
            simplify: false,
        }
    }
}

/// Result of handling one user input.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The session the turn was appended to (new or existing).
    pub session_id: Uuid,
    /// The assistant turn that was appended.
    pub reply: String,
    /// Synthesized speech for the reply, if synthesis succeeded.
    pub audio: Option<Vec<u8>>,
}

/// Central orchestrator wiring the leaf services to the session store.
pub struct ChatOrchestrator<A, E, T, S> {
    answer_service: A,
    tagger: E,
    translator: T,
    synthesis: S,
    session_manager: SessionManager,
    sessions: Mutex<HashMap<Uuid, ConversationSession>>,
    config: ChatSettings,
    max_synthesis_chars: usize,
}

impl<A, E, T, S> ChatOrchestrator<A, E, T, S>
where
    A: AnswerService,
    E: EntityTagger,
    T: Translator,
    S: SynthesisService,
{
    /// Create a new orchestrator with the given configuration and services.
    pub fn new(
        config: ChatSettings,
        max_synthesis_chars: usize,
        answer_service: A,
        tagger: E,
        translator: T,
        synthesis: S,
    ) -> Self {
        let session_manager = SessionManager::new(config.session_timeout_minutes);
        Self {
            answer_service,
            tagger,
            translator,
            synthesis,
            session_manager,
            sessions: Mutex::new(HashMap::new()),
            config,
            max_synthesis_chars,
        }
    }

    /// Handle one unit of user input.
    ///
    /// Text and speech append a pending user turn and answer it; image and
    /// PDF results bypass the question-answering path and append an
    /// assistant turn directly. Every appended assistant turn is also
    /// synthesized to audio as a side effect.
    pub async fn submit(
        &self,
        session_id: Option<Uuid>,
        input: UserInput,
        opts: &TurnOptions,
    ) -> Result<SubmitOutcome, ChatError> {
        match input {
            UserInput::Text(text) | UserInput::Speech(text) => {
                self.submit_question(session_id, text, opts).await
            }
            UserInput::ImageAnalysis(text) => {
                self.append_assistant(session_id, text, opts).await
            }
            UserInput::PdfText(text) => {
                if text.is_empty() {
                    return Err(ChatError::EmptyMessage);
                }
                let preview: String = text.chars().take(PDF_PREVIEW_CHARS).collect();
                let framed = format!("\u{1f4d8} Extracted Report:\n\n{}...", preview);
                self.append_assistant(session_id, framed, opts).await
            }
        }
    }

    /// Answer a single question without touching any session.
    ///
    /// Runs the same greeting check and answer pipeline as `submit`, using
    /// the caller-supplied context verbatim. No turn is recorded and no
    /// audio is produced.
    pub async fn answer_once(
        &self,
        question: &str,
        context: &str,
        opts: &TurnOptions,
    ) -> Result<String, ChatError> {
        if question.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if question.len() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }
        if is_greeting(question) {
            return Ok(canned_greeting(&opts.language).to_string());
        }
        Ok(self.compose_answer(question, context.to_string(), opts).await)
    }

    /// Direct access to the answer service, mainly for tests against mocks.
    pub fn answer_service(&self) -> &A {
        &self.answer_service
    }

    /// Get a session by ID.
    pub fn get_session(&self, session_id: Uuid) -> Option<ConversationSession> {
        self.sessions
            .lock()
            .ok()
            .and_then(|s| s.get(&session_id).cloned())
    }

    /// List all active sessions as summaries.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let sessions = match self.sessions.lock() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        sessions
            .values()
            .map(|s| self.session_manager.summarize(s))
            .collect()
    }

    /// Delete a session and its conversation.
    pub fn delete_session(&self, session_id: Uuid) -> Result<(), ChatError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| ChatError::ServiceError(format!("session lock poisoned: {}", e)))?;
        if sessions.remove(&session_id).is_some() {
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(session_id))
        }
    }

    /// Get the full turn history for a session.
    pub fn get_history(&self, session_id: Uuid) -> Result<Vec<Turn>, ChatError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|e| ChatError::ServiceError(format!("session lock poisoned: {}", e)))?;
        sessions
            .get(&session_id)
            .map(|s| s.conversation.turns().to_vec())
            .ok_or(ChatError::SessionNotFound(session_id))
    }

    // -- Private helpers --

    /// Question path: append a pending user turn, then answer it.
    async fn submit_question(
        &self,
        session_id: Option<Uuid>,
        text: String,
        opts: &TurnOptions,
    ) -> Result<SubmitOutcome, ChatError> {
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.len() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        let sid = self.resolve_session(session_id)?;

        // Append the pending turn and snapshot the context before it.
        let context = {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|e| ChatError::ServiceError(format!("session lock poisoned: {}", e)))?;
            let session = sessions
                .get_mut(&sid)
                .ok_or(ChatError::SessionNotFound(sid))?;
            session.conversation.push_user(text.clone());
            session.last_message_at = Local::now().timestamp();
            session.message_count += 1;
            build_context(&session.conversation, self.config.context_pairs)
        };

        let reply = if is_greeting(&text) {
            // Greeting short-circuit: the answer service is not invoked.
            tracing::debug!("Greeting detected; using canned reply");
            canned_greeting(&opts.language).to_string()
        } else {
            self.compose_answer(&text, context, opts).await
        };

        self.finish_turn(sid, reply, opts).await
    }

    /// Image/PDF path: append an assistant turn directly.
    async fn append_assistant(
        &self,
        session_id: Option<Uuid>,
        text: String,
        opts: &TurnOptions,
    ) -> Result<SubmitOutcome, ChatError> {
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let sid = self.resolve_session(session_id)?;
        self.finish_turn(sid, text, opts).await
    }

    /// Append the assistant turn and synthesize it.
    async fn finish_turn(
        &self,
        sid: Uuid,
        reply: String,
        opts: &TurnOptions,
    ) -> Result<SubmitOutcome, ChatError> {
        {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|e| ChatError::ServiceError(format!("session lock poisoned: {}", e)))?;
            let session = sessions
                .get_mut(&sid)
                .ok_or(ChatError::SessionNotFound(sid))?;
            session.conversation.push_assistant(reply.clone());
            session.last_message_at = Local::now().timestamp();
        }

        let audio = self.synthesize_reply(&reply, &opts.language).await;

        Ok(SubmitOutcome {
            session_id: sid,
            reply,
            audio,
        })
    }

    /// Run the answer pipeline: generate, highlight, translate.
    ///
    /// Never fails: an answer-service failure degrades to the fixed
    /// fallback string, and a highlight or translation failure degrades to
    /// the text produced so far, keeping the conversation displayable.
    async fn compose_answer(&self, question: &str, context: String, opts: &TurnOptions) -> String {
        let request = AnswerRequest {
            question: question.to_string(),
            context,
            tone: opts.tone,
            simplify: opts.simplify,
        };

        let raw = match self.answer_service.answer(&request).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Answer service failed");
                return NO_RESPONSE.to_string();
            }
        };

        let highlighted = match highlight(&self.tagger, &raw).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Entity highlighting failed; using raw answer");
                raw
            }
        };

        match self.translator.translate(&highlighted, &opts.language).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Translation failed; using untranslated answer");
                highlighted
            }
        }
    }

    /// Synthesize a reply; failure yields no audio rather than an error.
    async fn synthesize_reply(&self, reply: &str, language: &str) -> Option<Vec<u8>> {
        let cleaned = clean_for_synthesis(reply, self.max_synthesis_chars);
        if cleaned.is_empty() {
            return None;
        }
        match self.synthesis.synthesize(&cleaned, language).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::warn!(error = %e, "Speech synthesis failed");
                None
            }
        }
    }

    /// Resolve or create a session ID.
    fn resolve_session(&self, requested: Option<Uuid>) -> Result<Uuid, ChatError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| ChatError::ServiceError(format!("session lock poisoned: {}", e)))?;

        if let Some(sid) = requested {
            if let Some(session) = sessions.get(&sid) {
                if !self.session_manager.is_expired(session) {
                    return Ok(sid);
                }
                // Session expired; remove and create new.
                sessions.remove(&sid);
            }
        }

        let session = self.session_manager.create_session();
        let sid = session.id;
        sessions.insert(sid, session);
        Ok(sid)
    }
}

// =============================================================================
// Tests
// =============================================================================
