//! Route handler functions for all API endpoints.
//!
//! Each handler extracts form, JSON, or multipart input via axum
//! extractors, interacts with AppState services, and returns JSON
//! responses.

use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, State};
use axum::{Form, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mediq_answer::AnswerService;
use mediq_chat::{SessionSummary, TurnOptions, UserInput};
use mediq_core::types::{Tone, Turn};
use mediq_extract::{extract_pdf_text, store_upload, ImageAnalyzer};
use mediq_highlight::EntityTagger;
use mediq_speech::{SynthesisService, TranscriptionService};
use mediq_translate::Translator;

use crate::error::ApiError;
use crate::state::AppState;

fn default_tone() -> String {
    "formal".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

// =============================================================================
// Request and response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AskForm {
    pub question: String,
    #[serde(default)]
    pub context: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub simplify: bool,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<Uuid>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub simplify: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub reply: String,
    /// Base64-encoded synthesized speech, when synthesis succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Transcript of the voice input, for voice submissions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeImageResponse {
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadPdfResponse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
}

/// Per-turn options parsed from request fields.
fn turn_options(language: String, tone: &str, simplify: bool) -> TurnOptions {
    TurnOptions {
        language,
        tone: Tone::parse(tone),
        simplify,
    }
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness check with uptime and session count.
pub async fn health<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
) -> Json<HealthResponse>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.orchestrator.list_sessions().len(),
    })
}

/// POST /ask - stateless question answering with caller-supplied context.
pub async fn ask<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
    Form(form): Form<AskForm>,
) -> Result<Json<AskResponse>, ApiError>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    let opts = turn_options(form.language, &form.tone, form.simplify);
    let answer = state
        .orchestrator
        .answer_once(&form.question, &form.context, &opts)
        .await?;
    Ok(Json(AskResponse { answer }))
}

/// POST /chat - session-scoped text message.
pub async fn chat<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    let opts = turn_options(req.language, &req.tone, req.simplify);
    let outcome = state
        .orchestrator
        .submit(req.session_id, UserInput::Text(req.message), &opts)
        .await?;

    Ok(Json(ChatResponse {
        session_id: outcome.session_id,
        reply: outcome.reply,
        audio: outcome.audio.map(|bytes| BASE64.encode(bytes)),
        transcript: None,
    }))
}

/// POST /chat/voice - session-scoped voice message (multipart audio).
pub async fn chat_voice<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
    mut multipart: Multipart,
) -> Result<Json<ChatResponse>, ApiError>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    let mut audio: Option<Vec<u8>> = None;
    let mut session_id: Option<Uuid> = None;
    let mut language = default_language();
    let mut tone = default_tone();
    let mut simplify = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "audio" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read audio: {}", e)))?;
                audio = Some(bytes.to_vec());
            }
            "session_id" => {
                let text = field.text().await.unwrap_or_default();
                session_id = Some(
                    text.parse()
                        .map_err(|_| ApiError::BadRequest("Invalid session_id".to_string()))?,
                );
            }
            "language" => language = field.text().await.unwrap_or_default(),
            "tone" => tone = field.text().await.unwrap_or_default(),
            "simplify" => simplify = field.text().await.unwrap_or_default() == "true",
            _ => {}
        }
    }

    let audio =
        audio.ok_or_else(|| ApiError::BadRequest("Field 'audio' is required".to_string()))?;
    if audio.is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'audio' must not be empty".to_string(),
        ));
    }

    let transcript = state.transcription.transcribe(&audio, &language).await?;

    let opts = turn_options(language, &tone, simplify);
    let outcome = state
        .orchestrator
        .submit(session_id, UserInput::Speech(transcript.clone()), &opts)
        .await?;

    Ok(Json(ChatResponse {
        session_id: outcome.session_id,
        reply: outcome.reply,
        audio: outcome.audio.map(|bytes| BASE64.encode(bytes)),
        transcript: Some(transcript),
    }))
}

/// POST /analyze_image - analyze a medical image (multipart "image").
///
/// With an optional "session_id" field the analysis is also appended to
/// that conversation as an assistant turn.
pub async fn analyze_image<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeImageResponse>, ApiError>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut session_id: Option<Uuid> = None;
    let mut language = default_language();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "image" => {
                let mime = field
                    .content_type()
                    .unwrap_or("image/png")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
                image = Some((bytes.to_vec(), mime));
            }
            "session_id" => {
                let text = field.text().await.unwrap_or_default();
                session_id = Some(
                    text.parse()
                        .map_err(|_| ApiError::BadRequest("Invalid session_id".to_string()))?,
                );
            }
            "language" => language = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    let (bytes, mime) =
        image.ok_or_else(|| ApiError::BadRequest("Field 'image' is required".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'image' must not be empty".to_string(),
        ));
    }

    let analysis = state.image_analyzer.analyze(&bytes, &mime).await?;

    let recorded_session = if let Some(sid) = session_id {
        let opts = turn_options(language, "formal", false);
        let outcome = state
            .orchestrator
            .submit(Some(sid), UserInput::ImageAnalysis(analysis.clone()), &opts)
            .await?;
        Some(outcome.session_id)
    } else {
        None
    };

    Ok(Json(AnalyzeImageResponse {
        analysis,
        session_id: recorded_session,
    }))
}

/// POST /upload_pdf - extract text from a PDF report (multipart "file").
///
/// The upload is stored under the configured data directory before
/// extraction. With an optional "session_id" field a framed preview is
/// appended to that conversation as an assistant turn.
pub async fn upload_pdf<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
    mut multipart: Multipart,
) -> Result<Json<UploadPdfResponse>, ApiError>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut session_id: Option<Uuid> = None;
    let mut language = default_language();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((bytes.to_vec(), filename));
            }
            "session_id" => {
                let text = field.text().await.unwrap_or_default();
                session_id = Some(
                    text.parse()
                        .map_err(|_| ApiError::BadRequest("Invalid session_id".to_string()))?,
                );
            }
            "language" => language = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    let (bytes, filename) =
        file.ok_or_else(|| ApiError::BadRequest("Field 'file' is required".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'file' must not be empty".to_string(),
        ));
    }

    let data_dir = FsPath::new(&state.config.general.data_dir);
    let stored = store_upload(data_dir, &filename, &bytes)?;
    let content = extract_pdf_text(&stored)?;

    let recorded_session = if let Some(sid) = session_id {
        let opts = turn_options(language, "formal", false);
        let outcome = state
            .orchestrator
            .submit(Some(sid), UserInput::PdfText(content.clone()), &opts)
            .await?;
        Some(outcome.session_id)
    } else {
        None
    };

    Ok(Json(UploadPdfResponse {
        content,
        session_id: recorded_session,
    }))
}

/// GET /chat/sessions - list active sessions.
pub async fn list_sessions<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
) -> Json<SessionsResponse>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    Json(SessionsResponse {
        sessions: state.orchestrator.list_sessions(),
    })
}

/// DELETE /chat/sessions/{id} - delete a session and its conversation.
pub async fn delete_session<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    state.orchestrator.delete_session(id)?;
    Ok(Json(serde_json::json!({ "status": "deleted", "id": id })))
}

/// GET /chat/sessions/{id}/history - full turn history of a session.
pub async fn session_history<A, E, T, S, V, I>(
    State(state): State<AppState<A, E, T, S, V, I>>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    let turns = state.orchestrator.get_history(id)?;
    Ok(Json(HistoryResponse {
        session_id: id,
        turns,
    }))
}
