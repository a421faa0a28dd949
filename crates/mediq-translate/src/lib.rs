//! MedIQ translate crate - answer translation into the output language.
//!
//! Provides the Translator trait, a fixed language-to-model map, an
//! HttpTranslator backed by hosted Marian translation models, and a
//! MockTranslator for tests. English and unsupported codes are identity:
//! the input text is returned unchanged without any network call.

use std::future::Future;

use serde::Deserialize;

use mediq_core::error::MediqError;

// =============================================================================
// Language model map
// =============================================================================

/// Translation model for a 2-letter target code, if one is configured.
pub fn model_for(lang: &str) -> Option<&'static str> {
    match lang {
        "fr" => Some("Helsinki-NLP/opus-mt-en-fr"),
        "es" => Some("Helsinki-NLP/opus-mt-en-es"),
        "de" => Some("Helsinki-NLP/opus-mt-en-de"),
        "hi" => Some("Helsinki-NLP/opus-mt-en-hi"),
        "zh" => Some("Helsinki-NLP/opus-mt-en-zh"),
        _ => None,
    }
}

// =============================================================================
// Trait
// =============================================================================

/// Service translating text into a target language.
///
/// Every implementation must treat "en" and codes without a configured
/// model as identity.
pub trait Translator: Send + Sync {
    /// Translate `text` into the language named by the 2-letter `lang` code.
    fn translate(
        &self,
        text: &str,
        lang: &str,
    ) -> impl Future<Output = Result<String, MediqError>> + Send;
}

// =============================================================================
// HTTP translator
// =============================================================================

#[derive(Debug, Deserialize)]
struct TranslationRow {
    translation_text: String,
}

/// Translator backed by hosted Marian translation models.
pub struct HttpTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranslator {
    /// Create a translator for the given inference API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, lang: &str) -> Result<String, MediqError> {
        if lang == "en" {
            return Ok(text.to_string());
        }
        let Some(model) = model_for(lang) else {
            tracing::debug!(lang, "No translation model configured; returning input");
            return Ok(text.to_string());
        };

        let url = format!("{}/{}", self.base_url, model);
        let body = serde_json::json!({ "inputs": text });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MediqError::Translate(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediqError::Translate(format!(
                "translator returned {}: {}",
                status, error_text
            )));
        }

        let rows: Vec<TranslationRow> = response
            .json()
            .await
            .map_err(|e| MediqError::Translate(format!("invalid response body: {}", e)))?;

        rows.into_iter()
            .next()
            .map(|r| r.translation_text)
            .ok_or_else(|| MediqError::Translate("empty translation response".to_string()))
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock translator for tests.
///
/// `identity()` returns input unchanged for every language; `tagging()`
/// prefixes translated text with `[lang] ` so tests can observe that the
/// translation step ran.
#[derive(Debug, Clone, Default)]
pub struct MockTranslator {
    tag_output: bool,
    fail: bool,
}

impl MockTranslator {
    /// Mock returning input unchanged for every language.
    pub fn identity() -> Self {
        Self {
            tag_output: false,
            fail: false,
        }
    }

    /// Mock prefixing non-English output with `[lang] `.
    pub fn tagging() -> Self {
        Self {
            tag_output: true,
            fail: false,
        }
    }

    /// Mock failing for every non-identity translation.
    pub fn failing() -> Self {
        Self {
            tag_output: false,
            fail: true,
        }
    }
}

impl Translator for MockTranslator {
    async fn translate(&self, text: &str, lang: &str) -> Result<String, MediqError> {
        if lang == "en" || model_for(lang).is_none() {
            return Ok(text.to_string());
        }
        if self.fail {
            return Err(MediqError::Translate("mock failure".to_string()));
        }
        if self.tag_output {
            Ok(format!("[{}] {}", lang, text))
        } else {
            Ok(text.to_string())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Model map ----

    #[test]
    fn test_model_for_supported_languages() {
        assert_eq!(model_for("fr"), Some("Helsinki-NLP/opus-mt-en-fr"));
        assert_eq!(model_for("es"), Some("Helsinki-NLP/opus-mt-en-es"));
        assert_eq!(model_for("de"), Some("Helsinki-NLP/opus-mt-en-de"));
        assert_eq!(model_for("hi"), Some("Helsinki-NLP/opus-mt-en-hi"));
        assert_eq!(model_for("zh"), Some("Helsinki-NLP/opus-mt-en-zh"));
    }

    #[test]
    fn test_model_for_english_and_unsupported() {
        assert_eq!(model_for("en"), None);
        assert_eq!(model_for("pt"), None);
        assert_eq!(model_for(""), None);
    }

    // ---- Identity properties ----

    #[tokio::test]
    async fn test_english_is_identity() {
        let translator = MockTranslator::tagging();
        let text = "some answer text";
        let out = translator.translate(text, "en").await.unwrap();
        assert_eq!(out, text);
    }

    #[tokio::test]
    async fn test_unsupported_code_is_identity() {
        let translator = MockTranslator::tagging();
        let text = "some answer text";
        let out = translator.translate(text, "xx").await.unwrap();
        assert_eq!(out, text);
    }

    #[tokio::test]
    async fn test_english_identity_even_when_failing() {
        // The "en" short-circuit happens before any service call.
        let translator = MockTranslator::failing();
        let out = translator.translate("text", "en").await.unwrap();
        assert_eq!(out, "text");
    }

    #[tokio::test]
    async fn test_http_translator_english_no_network() {
        // With an unroutable base URL, "en" must still succeed because no
        // request is made.
        let translator = HttpTranslator::new("http://127.0.0.1:1");
        let out = translator.translate("hello", "en").await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_http_translator_unsupported_no_network() {
        let translator = HttpTranslator::new("http://127.0.0.1:1");
        let out = translator.translate("hello", "xx").await.unwrap();
        assert_eq!(out, "hello");
    }

    // ---- Mock behavior ----

    #[tokio::test]
    async fn test_tagging_mock_marks_translation() {
        let translator = MockTranslator::tagging();
        let out = translator.translate("hello", "fr").await.unwrap();
        assert_eq!(out, "[fr] hello");
    }

    #[tokio::test]
    async fn test_failing_mock_errors_for_supported_language() {
        let translator = MockTranslator::failing();
        let result = translator.translate("hello", "fr").await;
        assert!(result.is_err());
    }

    // ---- Response parsing ----

    #[test]
    fn test_translation_row_deserialization() {
        let json = r#"[{"translation_text":"Bonjour le monde"}]"#;
        let rows: Vec<TranslationRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].translation_text, "Bonjour le monde");
    }
}
