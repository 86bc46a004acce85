//! Transcription boundary endpoint.
//!
//! `POST /api/transcribe?language=<tag>` accepts raw audio bytes with a
//! `Content-Type` header and responds with the normalized transcript
//! envelope `{results:{channels:[{alternatives:[{transcript}]}]}}`,
//! regardless of which upstream provider served the request. Failures map
//! onto the gateway's error taxonomy as JSON `{error}` bodies.

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use canvass_voice::{AudioSegment, TranscriptEnvelope, VoiceError};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TranscribeQuery {
    /// Language hint forwarded to providers; defaults to the configured
    /// gateway language.
    #[serde(default)]
    pub language: Option<String>,
}

pub async fn transcribe(
    Extension(state): Extension<AppState>,
    Query(query): Query<TranscribeQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let segment = AudioSegment::new(body.to_vec(), content_type);

    tracing::debug!(
        bytes = segment.bytes.len(),
        content_type = %segment.content_type,
        "transcription request"
    );

    let language = query
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| state.gateway.config().language.clone());

    match state
        .gateway
        .transcribe_with_language(&segment, &language)
        .await
    {
        Ok(transcript) => {
            (StatusCode::OK, Json(TranscriptEnvelope::from_transcript(transcript)))
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: VoiceError) -> Response {
    let status = match &error {
        VoiceError::NoAudioCaptured => StatusCode::BAD_REQUEST,
        VoiceError::SegmentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        VoiceError::TranscriptionUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        VoiceError::TranscriptionFailed(_) | VoiceError::Provider { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    tracing::warn!(%status, error = %error, "transcription request failed");
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
