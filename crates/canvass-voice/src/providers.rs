//! Provider adapters for the transcription gateway.
//!
//! Each adapter normalizes its provider's response shape into bare
//! transcript text: Whisper replies `{text}`, Deepgram replies the
//! channel/alternative envelope. Neither shape leaks past this module.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::VoiceError;
use crate::transcribe::{AudioSegment, TranscriptEnvelope, TranscriptionProvider};

/// Per-request timeout baked into each provider's HTTP client. The gateway
/// additionally bounds the primary attempt with its own configurable limit.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const WHISPER_MODEL: &str = "whisper-1";

const DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com";
const DEEPGRAM_MODEL: &str = "nova-2";

/// Maps a segment's content type to the container extension the Whisper
/// upload requires. Parameters (e.g. `;codecs=opus`) are ignored; unmapped
/// types default to the webm container.
fn extension_for(content_type: &str) -> &'static str {
    let base = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match base.as_str() {
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/mp4" => "mp4",
        "audio/mpeg" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/flac" => "flac",
        _ => "webm",
    }
}

fn build_client(provider: &'static str) -> Result<reqwest::Client, VoiceError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| VoiceError::Provider {
            provider,
            message: e.to_string(),
        })
}

/// Primary provider: OpenAI Whisper transcription over multipart upload.
#[derive(Debug, Clone)]
pub struct WhisperProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
}

impl WhisperProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, VoiceError> {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    /// Points the adapter at an alternate OpenAI-compatible endpoint.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, VoiceError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: WHISPER_MODEL.to_string(),
            client: build_client("whisper")?,
        })
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperProvider {
    fn name(&self) -> &'static str {
        "whisper"
    }

    async fn transcribe(
        &self,
        segment: &AudioSegment,
        language: &str,
    ) -> Result<String, VoiceError> {
        let ext = extension_for(&segment.content_type);
        let part = reqwest::multipart::Part::bytes(segment.bytes.clone())
            .file_name(format!("recording.{ext}"))
            .mime_str(&segment.content_type)
            .map_err(|e| VoiceError::Provider {
                provider: self.name(),
                message: e.to_string(),
            })?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", language.to_string());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Provider {
                provider: self.name(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Provider {
                provider: self.name(),
                message: format!("API error {status}: {body}"),
            });
        }

        let parsed: WhisperResponse =
            response.json().await.map_err(|e| VoiceError::Provider {
                provider: self.name(),
                message: e.to_string(),
            })?;
        Ok(parsed.text)
    }
}

/// Secondary provider: Deepgram prerecorded transcription over raw bytes.
#[derive(Debug, Clone)]
pub struct DeepgramProvider {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl DeepgramProvider {
    pub fn new(token: impl Into<String>) -> Result<Self, VoiceError> {
        Self::with_base_url(token, DEEPGRAM_BASE_URL)
    }

    /// Points the adapter at an alternate Deepgram-compatible endpoint.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, VoiceError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: build_client("deepgram")?,
        })
    }
}

#[async_trait]
impl TranscriptionProvider for DeepgramProvider {
    fn name(&self) -> &'static str {
        "deepgram"
    }

    async fn transcribe(
        &self,
        segment: &AudioSegment,
        _language: &str,
    ) -> Result<String, VoiceError> {
        let response = self
            .client
            .post(format!("{}/v1/listen", self.base_url))
            .query(&[
                ("model", DEEPGRAM_MODEL),
                ("smart_format", "true"),
                ("numerals", "true"),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", &segment.content_type)
            .body(segment.bytes.clone())
            .send()
            .await
            .map_err(|e| VoiceError::Provider {
                provider: self.name(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Provider {
                provider: self.name(),
                message: format!("API error {status}: {body}"),
            });
        }

        let envelope: TranscriptEnvelope =
            response.json().await.map_err(|e| VoiceError::Provider {
                provider: self.name(),
                message: e.to_string(),
            })?;
        Ok(envelope.transcript().to_string())
    }
}
