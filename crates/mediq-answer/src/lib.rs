//! MedIQ answer crate - generative-model client for question answering.
//!
//! Provides the AnswerService trait for producing a natural-language answer
//! from a question plus optional context, a GeminiClient that calls the
//! generative-language REST API, and a MockAnswerService for testing
//! without network access.

pub mod prompt;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use mediq_core::error::MediqError;
use mediq_core::types::AnswerRequest;

pub use prompt::build_prompt;

// =============================================================================
// Trait
// =============================================================================

/// Service producing one natural-language answer per request.
///
/// Implementations wrap an external generative model behind a uniform async
/// interface. Calls are synchronous request/response with no retry policy;
/// callers decide how to degrade on failure.
pub trait AnswerService: Send + Sync {
    /// Answer the given question.
    ///
    /// # Arguments
    /// * `request` - Question, formatted context, tone, and simplify flag.
    ///
    /// # Returns
    /// The trimmed answer text. An empty or missing model response is an error.
    fn answer(
        &self,
        request: &AnswerRequest,
    ) -> impl Future<Output = Result<String, MediqError>> + Send;
}

// =============================================================================
// Gemini client
// =============================================================================

/// Client for the generative-language `generateContent` REST endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a new client for the given model and API key.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Send a raw prompt and return the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, MediqError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MediqError::Answer(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediqError::Answer(format!(
                "model returned {}: {}",
                status, error_text
            )));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MediqError::Answer(format!("invalid response body: {}", e)))?;

        parse_generate_response(&value)
    }
}

impl AnswerService for GeminiClient {
    async fn answer(&self, request: &AnswerRequest) -> Result<String, MediqError> {
        let prompt = build_prompt(request);
        tracing::debug!(
            question_len = request.question.len(),
            context_len = request.context.len(),
            simplify = request.simplify,
            "Sending answer request"
        );
        self.generate(&prompt).await
    }
}

/// Extract the first candidate's text from a `generateContent` response.
pub fn parse_generate_response(value: &serde_json::Value) -> Result<String, MediqError> {
    let text = value
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| MediqError::Answer("response contained no candidate text".to_string()))?;

    if text.is_empty() {
        return Err(MediqError::Answer("model returned empty text".to_string()));
    }
    Ok(text)
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock answer service for testing the chat pipeline without a real model.
///
/// Records every request it receives so tests can assert on the exact
/// payload; returns a fixed answer, or fails when constructed with
/// `failing()`.
#[derive(Debug, Default)]
pub struct MockAnswerService {
    response_text: String,
    fail: bool,
    calls: Mutex<Vec<AnswerRequest>>,
    call_count: AtomicUsize,
}

impl MockAnswerService {
    /// Create a mock returning default answer text.
    pub fn new() -> Self {
        Self::with_text("Mock answer: consult your physician for a full evaluation")
    }

    /// Create a mock returning the specified text.
    pub fn with_text(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing() -> Self {
        Self {
            response_text: String::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Number of times `answer` was invoked.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Copies of every request received, in call order.
    pub fn calls(&self) -> Vec<AnswerRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl AnswerService for MockAnswerService {
    async fn answer(&self, request: &AnswerRequest) -> Result<String, MediqError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        if self.fail {
            return Err(MediqError::Answer("mock failure".to_string()));
        }
        Ok(self.response_text.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================
