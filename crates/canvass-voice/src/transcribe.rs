//! Transcription gateway with ordered provider fallback.
//!
//! The gateway converts one captured audio segment into transcript text. A
//! primary provider is tried first under a bounded timeout; if it errors,
//! times out, or returns an empty transcript, the *same* segment is
//! submitted to the secondary provider. Fallback is strictly sequential —
//! the primary's full failure is observed before the secondary is tried —
//! which bounds provider cost at the price of latency, hence the timeout.
//!
//! Providers have different response shapes; each adapter normalizes its
//! own shape so callers only ever see a transcript `String` (or, at the
//! HTTP boundary, the [`TranscriptEnvelope`] every response is wrapped in).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VoiceError;
use crate::ProviderCredentials;
use crate::{DeepgramProvider, WhisperProvider};

/// Default content type assumed for captured audio.
pub const DEFAULT_CONTENT_TYPE: &str = "audio/webm";

/// One captured audio segment plus its container type.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl AudioSegment {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        Self {
            bytes,
            content_type: if content_type.trim().is_empty() {
                DEFAULT_CONTENT_TYPE.to_string()
            } else {
                content_type
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Normalized transcription response shape, independent of the upstream
/// provider: `{results:{channels:[{alternatives:[{transcript}]}]}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEnvelope {
    pub results: TranscriptResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResults {
    pub channels: Vec<TranscriptChannel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptChannel {
    pub alternatives: Vec<TranscriptAlternative>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptAlternative {
    pub transcript: String,
}

impl TranscriptEnvelope {
    /// Wraps a bare transcript in the normalized shape.
    pub fn from_transcript(transcript: impl Into<String>) -> Self {
        Self {
            results: TranscriptResults {
                channels: vec![TranscriptChannel {
                    alternatives: vec![TranscriptAlternative {
                        transcript: transcript.into(),
                    }],
                }],
            },
        }
    }

    /// First channel's first alternative, or `""` when absent.
    pub fn transcript(&self) -> &str {
        self.results
            .channels
            .first()
            .and_then(|channel| channel.alternatives.first())
            .map(|alternative| alternative.transcript.as_str())
            .unwrap_or("")
    }
}

/// Result-normalizing adapter over one transcription provider.
///
/// Implementations submit the segment to their provider and return the bare
/// transcript text — possibly empty, which the gateway treats as a failed
/// attempt. They never see or influence fallback ordering.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Short provider label for logs and error messages.
    fn name(&self) -> &'static str;

    async fn transcribe(&self, segment: &AudioSegment, language: &str)
        -> Result<String, VoiceError>;
}

/// Gateway tuning knobs.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bound on the primary provider call. Expiry counts as the primary's
    /// normal failure and triggers fallback.
    pub primary_timeout: Duration,
    /// Language hint forwarded to providers that accept one.
    pub language: String,
    /// Input cap; oversized segments are rejected up front.
    pub max_segment_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            primary_timeout: Duration::from_secs(30),
            language: "en".to_string(),
            max_segment_bytes: 10 * 1024 * 1024,
        }
    }
}

/// The transcription gateway: primary-then-secondary provider fallback
/// behind one normalized transcript result.
pub struct TranscriptionGateway {
    primary: Option<Box<dyn TranscriptionProvider>>,
    secondary: Option<Box<dyn TranscriptionProvider>>,
    config: GatewayConfig,
}

impl TranscriptionGateway {
    pub fn new(
        primary: Option<Box<dyn TranscriptionProvider>>,
        secondary: Option<Box<dyn TranscriptionProvider>>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            config,
        }
    }

    /// Wires providers from explicit credentials. A missing credential
    /// leaves that provider unconfigured; the gateway itself always
    /// constructs.
    pub fn from_credentials(
        credentials: &ProviderCredentials,
        config: GatewayConfig,
    ) -> Result<Self, VoiceError> {
        let primary = credentials
            .openai_api_key
            .as_deref()
            .map(WhisperProvider::new)
            .transpose()?
            .map(|p| Box::new(p) as Box<dyn TranscriptionProvider>);
        let secondary = credentials
            .deepgram_api_token
            .as_deref()
            .map(DeepgramProvider::new)
            .transpose()?
            .map(|p| Box::new(p) as Box<dyn TranscriptionProvider>);

        if primary.is_none() && secondary.is_none() {
            tracing::warn!("no transcription provider credentials configured");
        }

        Ok(Self::new(primary, secondary, config))
    }

    /// Wires providers from `OPENAI_API_KEY` / `DEEPGRAM_API_TOKEN`.
    pub fn from_env(config: GatewayConfig) -> Result<Self, VoiceError> {
        Self::from_credentials(&ProviderCredentials::from_env(), config)
    }

    /// True when at least one provider is available.
    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Transcribes using the configured language hint.
    pub async fn transcribe(&self, segment: &AudioSegment) -> Result<String, VoiceError> {
        let language = self.config.language.clone();
        self.transcribe_with_language(segment, &language).await
    }

    /// Transcribes one segment with the ordered fallback policy.
    ///
    /// Returns the trimmed, non-empty transcript, or one of
    /// [`VoiceError::NoAudioCaptured`], [`VoiceError::SegmentTooLarge`],
    /// [`VoiceError::TranscriptionUnavailable`],
    /// [`VoiceError::TranscriptionFailed`].
    pub async fn transcribe_with_language(
        &self,
        segment: &AudioSegment,
        language: &str,
    ) -> Result<String, VoiceError> {
        if segment.is_empty() {
            return Err(VoiceError::NoAudioCaptured);
        }
        if segment.bytes.len() > self.config.max_segment_bytes {
            return Err(VoiceError::SegmentTooLarge {
                size: segment.bytes.len(),
                limit: self.config.max_segment_bytes,
            });
        }

        match (&self.primary, &self.secondary) {
            (None, None) => Err(VoiceError::TranscriptionUnavailable),

            // Only the secondary is configured: call it directly, the
            // primary is never involved.
            (None, Some(secondary)) => {
                Self::attempt(secondary.as_ref(), segment, language, None)
                    .await
                    .map_err(|e| VoiceError::TranscriptionFailed(e.to_string()))
            }

            (Some(primary), secondary) => {
                let first = Self::attempt(
                    primary.as_ref(),
                    segment,
                    language,
                    Some(self.config.primary_timeout),
                )
                .await;

                let primary_err = match first {
                    Ok(transcript) => return Ok(transcript),
                    Err(e) => e,
                };
                tracing::warn!(
                    provider = primary.as_ref().name(),
                    error = %primary_err,
                    "primary transcription attempt failed"
                );

                match secondary {
                    Some(secondary) => {
                        Self::attempt(secondary.as_ref(), segment, language, None)
                            .await
                            .map_err(|secondary_err| {
                                tracing::warn!(
                                    provider = secondary.as_ref().name(),
                                    error = %secondary_err,
                                    "secondary transcription attempt failed"
                                );
                                VoiceError::TranscriptionFailed(format!(
                                    "{primary_err}; {secondary_err}"
                                ))
                            })
                    }
                    None => Err(VoiceError::TranscriptionFailed(primary_err.to_string())),
                }
            }
        }
    }

    /// Runs one provider attempt, treating an empty transcript as failure.
    async fn attempt(
        provider: &dyn TranscriptionProvider,
        segment: &AudioSegment,
        language: &str,
        limit: Option<Duration>,
    ) -> Result<String, VoiceError> {
        let call = provider.transcribe(segment, language);
        let transcript = match limit {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                VoiceError::Provider {
                    provider: provider.name(),
                    message: format!("timed out after {}s", limit.as_secs()),
                }
            })??,
            None => call.await?,
        };

        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(VoiceError::Provider {
                provider: provider.name(),
                message: "empty transcript".to_string(),
            });
        }
        Ok(transcript.to_string())
    }
}
