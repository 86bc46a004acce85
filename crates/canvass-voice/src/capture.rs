//! Audio capture state machine for one conversational turn.
//!
//! The original consumer tracked this lifecycle as four independent boolean
//! flags (`isRecording`, `isProcessing`, `isGettingSympathize`, `isSpeaking`),
//! which permits nonsense combinations. Here the turn lifecycle is one
//! explicit phase enum plus an orthogonal external `speaking` suppression
//! flag, so invalid combinations are unrepresentable.
//!
//! Concurrency contract: at most one audio segment is in flight at a time.
//! `start_recording` outside `Idle` is a no-op, not an error. Every turn
//! carries a [`TurnTicket`] stamped with a generation counter; results that
//! arrive after [`CaptureStateMachine::cancel`] or completion carry a stale
//! generation and are discarded without touching state.

/// Phase of the active turn's audio lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    /// Ready to record. The only phase that can start a new turn.
    #[default]
    Idle,
    /// Microphone capture in progress.
    Recording,
    /// Captured segment handed to the transcription gateway.
    Processing,
    /// Transcript accepted; the empathic-response call is in flight.
    Thinking,
}

/// Liveness token for one turn. Results tagged with a stale ticket are
/// ignored by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTicket {
    generation: u64,
}

/// State machine owning the listening / processing / thinking lifecycle.
#[derive(Debug, Default)]
pub struct CaptureStateMachine {
    phase: CapturePhase,
    generation: u64,
    speaking: bool,
    completed: bool,
    question_available: bool,
}

impl CaptureStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// True when a new recording cannot start: no active question, a turn
    /// already in flight, survey completed, or question playback speaking.
    pub fn is_disabled(&self) -> bool {
        !self.question_available
            || self.completed
            || self.speaking
            || self.phase != CapturePhase::Idle
    }

    /// Starts a new turn. Returns the turn's ticket, or `None` when the
    /// machine is disabled — a deliberate no-op, never an error.
    pub fn start_recording(&mut self) -> Option<TurnTicket> {
        if self.is_disabled() {
            tracing::debug!(
                phase = ?self.phase,
                speaking = self.speaking,
                completed = self.completed,
                question_available = self.question_available,
                "start_recording ignored while disabled"
            );
            return None;
        }
        self.generation += 1;
        self.phase = CapturePhase::Recording;
        Some(TurnTicket {
            generation: self.generation,
        })
    }

    /// Finalizes capture and enters `Processing`. Valid only while
    /// `Recording`; otherwise a no-op returning `None`.
    pub fn stop_recording(&mut self) -> Option<TurnTicket> {
        if self.phase != CapturePhase::Recording {
            return None;
        }
        self.phase = CapturePhase::Processing;
        Some(TurnTicket {
            generation: self.generation,
        })
    }

    /// True when the ticket still refers to the current turn.
    pub fn is_current(&self, ticket: TurnTicket) -> bool {
        !self.completed && ticket.generation == self.generation
    }

    /// Transcript accepted: `Processing` → `Thinking` while the empathic
    /// response is generated. Returns false (and changes nothing) for stale
    /// tickets or out-of-phase calls.
    pub fn begin_thinking(&mut self, ticket: TurnTicket) -> bool {
        if !self.is_current(ticket) || self.phase != CapturePhase::Processing {
            return false;
        }
        self.phase = CapturePhase::Thinking;
        true
    }

    /// The turn failed while processing (transcription error, empty
    /// transcript, or validation rejection): back to `Idle`, same question.
    pub fn processing_failed(&mut self, ticket: TurnTicket) -> bool {
        if !self.is_current(ticket) || self.phase != CapturePhase::Processing {
            return false;
        }
        self.phase = CapturePhase::Idle;
        true
    }

    /// The empathic response resolved and the next question is ready:
    /// `Thinking` → `Idle`.
    pub fn finish_thinking(&mut self, ticket: TurnTicket) -> bool {
        if !self.is_current(ticket) || self.phase != CapturePhase::Thinking {
            return false;
        }
        self.phase = CapturePhase::Idle;
        true
    }

    /// Abandons whatever turn is in flight. The generation bump makes every
    /// outstanding ticket stale, so in-flight results are discarded when
    /// they eventually arrive.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.phase = CapturePhase::Idle;
    }

    /// External playback flag: while true, recording cannot start.
    pub fn set_speaking(&mut self, speaking: bool) {
        self.speaking = speaking;
    }

    /// Whether a question is currently presented and answerable.
    pub fn set_question_available(&mut self, available: bool) {
        self.question_available = available;
    }

    /// Marks the survey completed. Terminal: stale-ticket discard applies to
    /// everything in flight and the machine stays disabled.
    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.generation += 1;
        self.phase = CapturePhase::Idle;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}
