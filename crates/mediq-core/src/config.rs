use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MediqError, Result};

/// Top-level configuration for the MedIQ application.
///
/// Loaded from `~/.mediq/config.toml` by default. Each section corresponds
/// to one backend service or cross-cutting concern. The generative-model
/// API key is never stored here; it is read from the environment variable
/// named in `[model].api_key_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediqConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub chat: ChatSettings,
}

impl Default for MediqConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            model: ModelConfig::default(),
            speech: SpeechConfig::default(),
            translate: TranslateConfig::default(),
            highlight: HighlightConfig::default(),
            chat: ChatSettings::default(),
        }
    }
}

impl MediqConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MediqConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MediqError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for uploaded images, PDFs, and audio artifacts.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Port for the HTTP API server.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.mediq/data".to_string(),
            log_level: "info".to_string(),
            port: 8000,
        }
    }
}

/// Generative-model backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent to the backend (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Base URL of the generative-language API.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "API_KEY".to_string(),
        }
    }
}

/// Speech service settings (transcription and synthesis endpoints).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Transcription (speech-to-text) endpoint URL.
    pub transcription_url: String,
    /// Synthesis (text-to-speech) endpoint URL.
    pub synthesis_url: String,
    /// Voice identifier for synthesis.
    pub voice: String,
    /// Maximum characters of text sent to synthesis per reply.
    pub max_synthesis_chars: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            transcription_url: "https://api.groq.com/openai/v1/audio/transcriptions".to_string(),
            synthesis_url: "https://api.openai.com/v1/audio/speech".to_string(),
            voice: "alloy".to_string(),
            max_synthesis_chars: 3000,
        }
    }
}

/// Translation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Base URL of the translation inference API.
    pub base_url: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co/models".to_string(),
        }
    }
}

/// Medical entity recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// URL of the named-entity-recognition inference endpoint.
    pub ner_url: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            ner_url: "https://api-inference.huggingface.co/models/d4data/biomedical-ner-all"
                .to_string(),
        }
    }
}

/// Conversation manager settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Number of completed question/answer pairs kept in the context window.
    pub context_pairs: usize,
    /// Session timeout in minutes.
    pub session_timeout_minutes: u32,
    /// Maximum message length in characters.
    pub max_message_length: usize,
    /// Default output language code (2-letter).
    pub default_language: String,
    /// Default answer tone: formal, friendly, child.
    pub default_tone: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            context_pairs: 3,
            session_timeout_minutes: 30,
            max_message_length: 2000,
            default_language: "en".to_string(),
            default_tone: "formal".to_string(),
        }
    }
}
