//! Router-level tests for the transcription endpoint, driven through
//! `tower::ServiceExt::oneshot` with scripted providers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use canvass_server::{app, AppState};
use canvass_voice::{
    AudioSegment, GatewayConfig, TranscriptionGateway, TranscriptionProvider, VoiceError,
};
use tower::ServiceExt;

struct FixedProvider {
    reply: Result<&'static str, &'static str>,
}

#[async_trait]
impl TranscriptionProvider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn transcribe(
        &self,
        _segment: &AudioSegment,
        _language: &str,
    ) -> Result<String, VoiceError> {
        match self.reply {
            Ok(text) => Ok(text.to_string()),
            Err(message) => Err(VoiceError::Provider {
                provider: "fixed",
                message: message.to_string(),
            }),
        }
    }
}

fn state_with(
    provider: Option<FixedProvider>,
    config: GatewayConfig,
) -> AppState {
    let primary = provider.map(|p| Box::new(p) as Box<dyn TranscriptionProvider>);
    AppState {
        gateway: Arc::new(TranscriptionGateway::new(primary, None, config)),
    }
}

fn audio_request(body: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/transcribe")
        .header("content-type", "audio/webm;codecs=opus")
        .body(Body::from(body.to_vec()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = app(state_with(None, GatewayConfig::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn transcribe_wraps_transcript_in_the_normalized_envelope() {
    let app = app(state_with(
        Some(FixedProvider {
            reply: Ok("I would say four"),
        }),
        GatewayConfig::default(),
    ));

    let response = app.oneshot(audio_request(&[1, 2, 3])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["results"]["channels"][0]["alternatives"][0]["transcript"],
        "I would say four"
    );
}

#[tokio::test]
async fn transcribe_without_providers_is_service_unavailable() {
    let app = app(state_with(None, GatewayConfig::default()));

    let response = app.oneshot(audio_request(&[1, 2, 3])).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("no transcription provider"));
}

#[tokio::test]
async fn transcribe_with_empty_body_is_bad_request() {
    let app = app(state_with(
        Some(FixedProvider { reply: Ok("x") }),
        GatewayConfig::default(),
    ));

    let response = app.oneshot(audio_request(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "no audio captured");
}

#[tokio::test]
async fn provider_failure_maps_to_internal_error() {
    let app = app(state_with(
        Some(FixedProvider {
            reply: Err("upstream exploded"),
        }),
        GatewayConfig::default(),
    ));

    let response = app.oneshot(audio_request(&[1, 2, 3])).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("transcription failed"));
}

#[tokio::test]
async fn oversized_segment_is_payload_too_large() {
    let config = GatewayConfig {
        max_segment_bytes: 4,
        ..GatewayConfig::default()
    };
    let app = app(state_with(Some(FixedProvider { reply: Ok("x") }), config));

    let response = app
        .oneshot(audio_request(&[0u8; 4096]))
        .await
        .unwrap();
    // Either the gateway cap (413 from the handler) or axum's body limit
    // applies; both must refuse the payload.
    assert!(
        response.status() == StatusCode::PAYLOAD_TOO_LARGE
            || response.status() == StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn language_query_parameter_is_accepted() {
    let app = app(state_with(
        Some(FixedProvider { reply: Ok("hola") }),
        GatewayConfig::default(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transcribe?language=es")
                .header("content-type", "audio/webm")
                .body(Body::from(vec![1, 2, 3]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["results"]["channels"][0]["alternatives"][0]["transcript"],
        "hola"
    );
}
