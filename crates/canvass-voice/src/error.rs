use thiserror::Error;

/// Errors raised by the audio capture and transcription layer.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The captured segment was empty.
    #[error("no audio captured")]
    NoAudioCaptured,

    /// Neither transcription provider has a credential configured.
    #[error("no transcription provider is configured")]
    TranscriptionUnavailable,

    /// Every attempted provider failed or returned an empty transcript.
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    /// The segment exceeds the gateway's input cap.
    #[error("audio segment exceeds maximum size: {size} bytes (limit: {limit} bytes)")]
    SegmentTooLarge { size: usize, limit: usize },

    /// A single provider attempt failed; the gateway folds these into
    /// [`VoiceError::TranscriptionFailed`] after fallback is exhausted.
    #[error("{provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
}

impl VoiceError {
    /// True for failures the conversation can recover from by re-recording
    /// the same question; configuration errors are not retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::TranscriptionUnavailable)
    }
}
