//! MedIQ extract crate - document ingestion for images and PDF reports.
//!
//! Provides the ImageAnalyzer trait for turning a medical image into
//! descriptive text via a vision-capable generative model, PDF text
//! extraction, and write-once persistence of uploaded files under the
//! configured data directory.

use std::future::Future;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use mediq_answer::parse_generate_response;
use mediq_core::error::MediqError;

/// Instruction sent alongside every image.
const IMAGE_ANALYSIS_PROMPT: &str =
    "You are a radiologist. Analyze the medical image for abnormalities.";

// =============================================================================
// Image analysis
// =============================================================================

/// Service producing descriptive text for an uploaded medical image.
pub trait ImageAnalyzer: Send + Sync {
    /// Analyze image bytes.
    ///
    /// # Arguments
    /// * `image` - Raw encoded image bytes (PNG or JPEG).
    /// * `mime` - MIME type of the image (e.g., "image/png").
    fn analyze(
        &self,
        image: &[u8],
        mime: &str,
    ) -> impl Future<Output = Result<String, MediqError>> + Send;
}

/// Image analyzer backed by the vision-capable generative model.
pub struct GeminiVisionClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiVisionClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }
}

impl ImageAnalyzer for GeminiVisionClient {
    async fn analyze(&self, image: &[u8], mime: &str) -> Result<String, MediqError> {
        if image.is_empty() {
            return Err(MediqError::Extract("Empty image data".to_string()));
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": IMAGE_ANALYSIS_PROMPT },
                    { "inline_data": { "mime_type": mime, "data": BASE64.encode(image) } }
                ]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MediqError::Extract(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediqError::Extract(format!(
                "vision model returned {}: {}",
                status, error_text
            )));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MediqError::Extract(format!("invalid response body: {}", e)))?;

        parse_generate_response(&value).map_err(|e| MediqError::Extract(e.to_string()))
    }
}

/// Mock image analyzer returning fixed text.
#[derive(Debug, Clone)]
pub struct MockImageAnalyzer {
    response_text: String,
}

impl MockImageAnalyzer {
    pub fn new() -> Self {
        Self::with_text("Mock analysis: no abnormalities detected")
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
        }
    }
}

impl Default for MockImageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageAnalyzer for MockImageAnalyzer {
    async fn analyze(&self, image: &[u8], _mime: &str) -> Result<String, MediqError> {
        if image.is_empty() {
            return Err(MediqError::Extract("Empty image data".to_string()));
        }
        Ok(self.response_text.clone())
    }
}

// =============================================================================
// PDF extraction
// =============================================================================

/// Extract the text of every page of a PDF, newline-joined and trimmed.
///
/// An unreadable PDF or one with no extractable text is an error surfaced
/// to the caller.
pub fn extract_pdf_text(path: &Path) -> Result<String, MediqError> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| MediqError::Extract(format!("PDF extraction failed: {}", e)))?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(MediqError::Extract(
            "PDF contained no extractable text".to_string(),
        ));
    }
    tracing::info!(chars = text.len(), path = %path.display(), "PDF text extracted");
    Ok(text)
}

// =============================================================================
// Upload persistence
// =============================================================================

/// Persist an uploaded file under the data directory, write-once.
///
/// The stored name keeps only the final path component of `filename` so an
/// upload can never escape the data directory. Returns the path written.
pub fn store_upload(data_dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, MediqError> {
    let safe_name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| MediqError::Extract(format!("invalid upload filename: {}", filename)))?;

    std::fs::create_dir_all(data_dir)?;
    let path = data_dir.join(safe_name);
    std::fs::write(&path, bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Upload stored");
    Ok(path)
}

// =============================================================================
// Tests
// =============================================================================
