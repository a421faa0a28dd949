//! MedIQ speech crate - speech-to-text and text-to-speech services.
//!
//! Provides trait-based abstractions for transcription (spoken audio to
//! text) and synthesis (text to playable audio), HTTP-backed
//! implementations, and mocks for testing. Synthesis input is cleaned of
//! highlight markup and truncated to a character budget first.

use std::future::Future;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use mediq_core::error::MediqError;

// =============================================================================
// Traits
// =============================================================================

/// Service converting spoken audio into text.
pub trait TranscriptionService: Send + Sync {
    /// Transcribe recorded audio bytes.
    ///
    /// # Arguments
    /// * `audio` - Encoded audio bytes (e.g., WAV or OGG).
    /// * `language` - 2-letter hint for the spoken language.
    ///
    /// # Returns
    /// The transcribed text. May be empty if nothing was recognized.
    fn transcribe(
        &self,
        audio: &[u8],
        language: &str,
    ) -> impl Future<Output = Result<String, MediqError>> + Send;
}

/// Service converting text into playable audio.
pub trait SynthesisService: Send + Sync {
    /// Synthesize speech for the given text.
    ///
    /// # Returns
    /// Encoded audio bytes ready for playback.
    fn synthesize(
        &self,
        text: &str,
        language: &str,
    ) -> impl Future<Output = Result<Vec<u8>, MediqError>> + Send;
}

// =============================================================================
// Synthesis input cleaning
// =============================================================================

fn highlight_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(\S+) (.+?)\*\*").expect("valid regex"))
}

/// Strip highlight markup and truncate to `max_chars` on a char boundary.
///
/// Entity wrapping (`**{emoji} {text}**`) is reduced to the bare entity
/// text so the marker characters are never spoken aloud.
pub fn clean_for_synthesis(text: &str, max_chars: usize) -> String {
    let stripped = highlight_marker_regex().replace_all(text, "$2");
    let stripped = stripped.replace("**", "");
    let trimmed = stripped.trim();
    trimmed.chars().take(max_chars).collect()
}

// =============================================================================
// HTTP transcription
// =============================================================================

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcription backed by a hosted Whisper-compatible endpoint.
pub struct HttpTranscriptionService {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpTranscriptionService {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

impl TranscriptionService for HttpTranscriptionService {
    async fn transcribe(&self, audio: &[u8], language: &str) -> Result<String, MediqError> {
        if audio.is_empty() {
            return Err(MediqError::Transcription(
                "Cannot transcribe empty audio".to_string(),
            ));
        }

        let file_part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("voice.wav")
            .mime_str("audio/wav")
            .map_err(|e| MediqError::Transcription(format!("invalid mime: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", "whisper-large-v3-turbo")
            .text("language", language.to_string())
            .text("response_format", "json");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediqError::Transcription(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediqError::Transcription(format!(
                "transcription service returned {}: {}",
                status, error_text
            )));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| MediqError::Transcription(format!("invalid response body: {}", e)))?;

        tracing::info!(chars = result.text.len(), "Transcription complete");
        Ok(result.text)
    }
}

// =============================================================================
// HTTP synthesis
// =============================================================================

/// Synthesis backed by a hosted text-to-speech endpoint.
pub struct HttpSynthesisService {
    client: reqwest::Client,
    url: String,
    api_key: String,
    voice: String,
}

impl HttpSynthesisService {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key: api_key.into(),
            voice: voice.into(),
        }
    }
}

impl SynthesisService for HttpSynthesisService {
    async fn synthesize(&self, text: &str, _language: &str) -> Result<Vec<u8>, MediqError> {
        if text.is_empty() {
            return Err(MediqError::Synthesis(
                "Cannot synthesize empty text".to_string(),
            ));
        }

        let body = serde_json::json!({
            "model": "tts-1",
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| MediqError::Synthesis(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediqError::Synthesis(format!(
                "synthesis service returned {}: {}",
                status, error_text
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| MediqError::Synthesis(format!("failed to read audio: {}", e)))?
            .to_vec();

        tracing::info!(bytes = audio.len(), voice = %self.voice, "Synthesis complete");
        Ok(audio)
    }
}

// =============================================================================
// Mock implementations
// =============================================================================

/// Mock transcription returning fixed text.
#[derive(Debug, Clone)]
pub struct MockTranscriptionService {
    response_text: String,
}

impl MockTranscriptionService {
    pub fn new() -> Self {
        Self::with_text("mock transcription")
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
        }
    }
}

impl Default for MockTranscriptionService {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptionService for MockTranscriptionService {
    async fn transcribe(&self, audio: &[u8], _language: &str) -> Result<String, MediqError> {
        if audio.is_empty() {
            return Err(MediqError::Transcription(
                "Cannot transcribe empty audio".to_string(),
            ));
        }
        Ok(self.response_text.clone())
    }
}

/// Mock synthesis returning the UTF-8 bytes of its input, or failing.
#[derive(Debug, Clone, Default)]
pub struct MockSynthesisService {
    fail: bool,
}

impl MockSynthesisService {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl SynthesisService for MockSynthesisService {
    async fn synthesize(&self, text: &str, _language: &str) -> Result<Vec<u8>, MediqError> {
        if self.fail {
            return Err(MediqError::Synthesis("mock failure".to_string()));
        }
        if text.is_empty() {
            return Err(MediqError::Synthesis(
                "Cannot synthesize empty text".to_string(),
            ));
        }
        Ok(text.as_bytes().to_vec())
    }
}

// =============================================================================
// Tests
// =============================================================================
