//! Mediq application binary - composition root.
//!
//! Ties together all Mediq crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Read the generative-model API key from the environment
//! 3. Construct the HTTP-backed service clients
//! 4. Assemble the chat orchestrator and shared API state
//! 5. Start the axum REST API server

use std::path::PathBuf;

use clap::Parser;

use mediq_answer::GeminiClient;
use mediq_api::{routes, AppState};
use mediq_chat::ChatOrchestrator;
use mediq_core::config::MediqConfig;
use mediq_extract::GeminiVisionClient;
use mediq_highlight::HttpEntityTagger;
use mediq_speech::{HttpSynthesisService, HttpTranscriptionService};
use mediq_translate::HttpTranslator;

mod cli;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = MediqConfig::load_or_default(&config_file);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    config.general.port = args.resolve_port(config.general.port);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.general.log_level.clone())
            }),
        )
        .init();

    tracing::info!("Starting Mediq v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // API key for the generative model, read from the configured env var.
    let api_key = match std::env::var(&config.model.api_key_env) {
        Ok(key) if !key.is_empty() => key,
        _ => {
            tracing::error!(
                var = %config.model.api_key_env,
                "Generative-model API key not set"
            );
            return Err(format!(
                "Environment variable {} must hold the model API key",
                config.model.api_key_env
            )
            .into());
        }
    };

    // Data directory for uploads.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    config.general.data_dir = data_dir.to_string_lossy().to_string();

    // Speech service API keys are optional; without them voice input and
    // spoken replies degrade to unavailable rather than blocking startup.
    let speech_key = std::env::var("SPEECH_API_KEY").unwrap_or_default();
    if speech_key.is_empty() {
        tracing::warn!("SPEECH_API_KEY not set; voice features will fail upstream");
    }

    // Service clients.
    let answer = GeminiClient::new(
        config.model.base_url.clone(),
        config.model.model.clone(),
        api_key.clone(),
    );
    let tagger = HttpEntityTagger::new(config.highlight.ner_url.clone());
    let translator = HttpTranslator::new(config.translate.base_url.clone());
    let transcription = HttpTranscriptionService::new(
        config.speech.transcription_url.clone(),
        speech_key.clone(),
    );
    let synthesis = HttpSynthesisService::new(
        config.speech.synthesis_url.clone(),
        speech_key,
        config.speech.voice.clone(),
    );
    let image_analyzer = GeminiVisionClient::new(
        config.model.base_url.clone(),
        config.model.model.clone(),
        api_key,
    );

    // Orchestrator and shared state.
    let orchestrator = ChatOrchestrator::new(
        config.chat.clone(),
        config.speech.max_synthesis_chars,
        answer,
        tagger,
        translator,
        synthesis,
    );
    let state = AppState::new(config, orchestrator, transcription, image_analyzer);

    tracing::info!("Chat orchestrator ready");

    routes::start_server(state).await?;

    Ok(())
}
