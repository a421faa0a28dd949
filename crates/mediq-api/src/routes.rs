//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, body
//! limits, and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mediq_answer::AnswerService;
use mediq_extract::ImageAnalyzer;
use mediq_highlight::EntityTagger;
use mediq_speech::{SynthesisService, TranscriptionService};
use mediq_translate::Translator;

use crate::handlers;
use crate::state::AppState;

/// Upload limit for images, PDFs, and voice clips.
const UPLOAD_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// Create the axum Router with all routes and middleware.
pub fn create_router<A, E, T, S, V, I>(state: AppState<A, E, T, S, V, I>) -> Router
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    // The frontend may be served from any origin.
    let cors = CorsLayer::permissive();

    // Upload routes carry a larger body limit than the text routes.
    let upload_routes = Router::new()
        .route("/analyze_image", post(handlers::analyze_image))
        .route("/upload_pdf", post(handlers::upload_pdf))
        .route("/chat/voice", post(handlers::chat_voice))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES));

    let text_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ask", post(handlers::ask))
        .route("/chat", post(handlers::chat))
        .route("/chat/sessions", get(handlers::list_sessions))
        .route("/chat/sessions/{id}", delete(handlers::delete_session))
        .route(
            "/chat/sessions/{id}/history",
            get(handlers::session_history),
        )
        .layer(DefaultBodyLimit::max(64 * 1024)); // 64KB for text bodies

    text_routes
        .merge(upload_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
///
/// Binds to 127.0.0.1 (localhost only) on the port from config.
pub async fn start_server<A, E, T, S, V, I>(
    state: AppState<A, E, T, S, V, I>,
) -> Result<(), mediq_core::error::MediqError>
where
    A: AnswerService + Send + Sync + 'static,
    E: EntityTagger + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: SynthesisService + Send + Sync + 'static,
    V: TranscriptionService + Send + Sync + 'static,
    I: ImageAnalyzer + Send + Sync + 'static,
{
    let port = state.config.general.port;
    let addr = format!("127.0.0.1:{}", port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| mediq_core::error::MediqError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| mediq_core::error::MediqError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
