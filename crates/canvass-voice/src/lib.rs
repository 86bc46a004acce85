//! Audio turn lifecycle and transcription for the Canvass engine.
//!
//! Two concerns live here:
//!
//! - [`capture`] — the explicit state machine for one conversational turn's
//!   audio lifecycle (idle → recording → processing → thinking), including
//!   the generation counter that makes late results from cancelled turns
//!   harmless no-ops.
//! - [`transcribe`] — the transcription gateway: a primary and a secondary
//!   provider behind one normalizing adapter interface, tried sequentially
//!   with a bounded timeout on the primary.

pub mod capture;
mod config;
mod error;
mod providers;
pub mod transcribe;

pub use capture::{CapturePhase, CaptureStateMachine, TurnTicket};
pub use config::ProviderCredentials;
pub use error::VoiceError;
pub use providers::{DeepgramProvider, WhisperProvider};
pub use transcribe::{
    AudioSegment, GatewayConfig, TranscriptEnvelope, TranscriptionGateway, TranscriptionProvider,
};
