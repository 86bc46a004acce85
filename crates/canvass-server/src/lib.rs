//! Canvass server library logic.
//!
//! Hosts the transcription boundary for the voice survey engine: raw audio
//! in, the provider-independent transcript envelope out. Rendering, session
//! storage, and the survey backend itself live elsewhere; this surface is
//! deliberately small.

pub mod api_transcribe;
pub mod config;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use canvass_voice::TranscriptionGateway;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The transcription gateway with its configured providers.
    pub gateway: Arc<TranscriptionGateway>,
}

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by load balancers,
/// monitoring, and CI to verify the server is running.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The request body limit tracks the gateway's segment cap so axum never
    // rejects a payload the gateway would have accepted.
    let body_limit = state.gateway.config().max_segment_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/api/transcribe", post(api_transcribe::transcribe))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
