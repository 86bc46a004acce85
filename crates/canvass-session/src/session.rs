use std::time::Instant;

use canvass_client::{ClientError, SurveyBackend};
use canvass_engine::{validator, QuestionGraphResolver, TranscriptLog};
use canvass_types::{Answer, AnswerBatch, AnsweredQuestion, SurveyStatus, TurnRecord};
use canvass_voice::{
    AudioSegment, CapturePhase, CaptureStateMachine, GatewayConfig, TranscriptionGateway,
    TurnTicket, VoiceError,
};
use uuid::Uuid;

use crate::SessionError;

/// Shown as the terminal transcript record when the plan is exhausted.
const COMPLETION_MESSAGE: &str = "That completes the survey. Thank you for your time!";

/// Re-prompt shown when a transcript fails validation.
const VALIDATION_RETRY_PROMPT: &str =
    "Sorry, that didn't answer the question. Please try again.";

/// Re-prompt shown when the audio could not be transcribed.
const TRANSCRIPTION_RETRY_PROMPT: &str = "Sorry, I couldn't catch that. Please try again.";

/// Result of driving one turn through `finish_recording`.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The result belonged to a cancelled or superseded turn and was
    /// discarded without touching conversation state.
    Discarded,

    /// The segment could not be transcribed. The same question stays
    /// current; the respondent may retry.
    TranscriptionFailed { error: VoiceError, prompt: String },

    /// The transcript did not satisfy the question's criteria. The same
    /// question stays current; the respondent may retry.
    Rejected { transcript: String, prompt: String },

    /// The answer was recorded and the next question presented.
    Advanced { transcript: String, sympathy: String },

    /// The answer was recorded and the plan is exhausted. Finalization ran;
    /// a submission failure is carried here (the batch is retained for
    /// [`ConversationSession::retry_submission`]).
    Completed {
        transcript: String,
        sympathy: String,
        submission: Result<(), ClientError>,
    },
}

/// One respondent's voice survey conversation, from first question to batch
/// submission.
pub struct ConversationSession<B: SurveyBackend> {
    backend: B,
    gateway: TranscriptionGateway,
    capture: CaptureStateMachine,
    transcript: TranscriptLog,
    resolver: Option<QuestionGraphResolver>,
    survey_id: String,
    session_id: Uuid,
    template_name: String,
    started_at: Option<Instant>,
    pending_batch: Option<AnswerBatch>,
    completed: bool,
}

impl<B: SurveyBackend> ConversationSession<B> {
    pub fn new(backend: B, gateway: TranscriptionGateway, survey_id: impl Into<String>) -> Self {
        Self {
            backend,
            gateway,
            capture: CaptureStateMachine::new(),
            transcript: TranscriptLog::new(),
            resolver: None,
            survey_id: survey_id.into(),
            session_id: Uuid::new_v4(),
            template_name: String::new(),
            started_at: None,
            pending_batch: None,
            completed: false,
        }
    }

    /// Convenience constructor wiring the gateway from the environment.
    pub fn from_env(
        backend: B,
        survey_id: impl Into<String>,
    ) -> Result<Self, VoiceError> {
        let gateway = TranscriptionGateway::from_env(GatewayConfig::default())?;
        Ok(Self::new(backend, gateway, survey_id))
    }

    /// Fetches the question set, builds the traversal plan, answers any
    /// leading autofilled questions, and presents the first live question.
    /// A plan that is empty (or entirely autofilled) completes immediately.
    pub async fn begin(&mut self) -> Result<(), SessionError> {
        if self.resolver.is_some() {
            return Err(SessionError::AlreadyStarted);
        }

        let survey = self.backend.fetch_questions(&self.survey_id).await?;
        tracing::info!(
            session = %self.session_id,
            survey = %self.survey_id,
            template = %survey.template_name,
            questions = survey.questions.len(),
            "conversation started"
        );
        self.template_name = survey.template_name;
        self.started_at = Some(Instant::now());
        self.resolver = Some(QuestionGraphResolver::new(survey.questions));

        self.drain_autofill()?;
        if self.resolver_is_complete() {
            if let Err(e) = self.finalize().await {
                tracing::warn!(error = %e, "submission failed for autofill-only survey");
            }
        } else {
            self.present_current();
        }
        Ok(())
    }

    /// Starts microphone capture for the current question. No-op (`None`)
    /// while disabled: no question presented, a turn already in flight, the
    /// survey completed, or question playback speaking.
    pub fn start_recording(&mut self) -> Option<TurnTicket> {
        self.capture.start_recording()
    }

    /// Abandons the in-flight turn, if any. Results that arrive afterwards
    /// are discarded.
    pub fn cancel(&mut self) {
        self.capture.cancel();
    }

    /// External playback flag; recording cannot start while speaking.
    pub fn set_speaking(&mut self, speaking: bool) {
        self.capture.set_speaking(speaking);
    }

    /// Finalizes the recorded segment and drives the turn to its outcome:
    /// transcription, validation, answer recording (with branch splicing),
    /// empathic response, and advancement or completion.
    pub async fn finish_recording(
        &mut self,
        segment: AudioSegment,
    ) -> Result<TurnOutcome, SessionError> {
        if self.completed {
            return Err(SessionError::AlreadyCompleted);
        }
        if self.resolver.is_none() {
            return Err(SessionError::NotStarted);
        }
        let Some(ticket) = self.capture.stop_recording() else {
            // Nothing is recording: the turn was cancelled or never started.
            return Ok(TurnOutcome::Discarded);
        };

        let transcript_text = match self.gateway.transcribe(&segment).await {
            Ok(text) => text,
            Err(error) => {
                if !self.capture.processing_failed(ticket) {
                    return Ok(TurnOutcome::Discarded);
                }
                tracing::warn!(
                    session = %self.session_id,
                    error = %error,
                    "transcription failed, re-prompting the same question"
                );
                self.transcript.push_message(TRANSCRIPTION_RETRY_PROMPT);
                return Ok(TurnOutcome::TranscriptionFailed {
                    error,
                    prompt: TRANSCRIPTION_RETRY_PROMPT.to_string(),
                });
            }
        };

        if !self.capture.is_current(ticket) {
            return Ok(TurnOutcome::Discarded);
        }

        let (question_id, question_text, normalized) = {
            let resolver = self.resolver.as_ref().ok_or(SessionError::NotStarted)?;
            let Some(planned) = resolver.current() else {
                return Ok(TurnOutcome::Discarded);
            };
            let question = &planned.question;
            match validator::normalize(question, &transcript_text) {
                Some(normalized) => (question.id.clone(), question.text.clone(), normalized),
                None => {
                    if !self.capture.processing_failed(ticket) {
                        return Ok(TurnOutcome::Discarded);
                    }
                    tracing::debug!(
                        session = %self.session_id,
                        question = %question.id,
                        transcript = %transcript_text,
                        "transcript rejected by validation"
                    );
                    self.transcript.push_message(VALIDATION_RETRY_PROMPT);
                    return Ok(TurnOutcome::Rejected {
                        transcript: transcript_text,
                        prompt: VALIDATION_RETRY_PROMPT.to_string(),
                    });
                }
            }
        };

        if !self.capture.begin_thinking(ticket) {
            return Ok(TurnOutcome::Discarded);
        }

        let resolver = self.resolver.as_mut().ok_or(SessionError::NotStarted)?;
        resolver.record_answer(Answer::new(
            question_id,
            transcript_text.clone(),
            normalized,
        ))?;
        self.transcript.push_user_answer(transcript_text.clone());

        // Best-effort by contract: the backend folds every failure into the
        // fixed fallback text, so empathy never blocks progression.
        let sympathy = self
            .backend
            .sympathize(&question_text, &transcript_text)
            .await;
        self.transcript.push_sympathy(sympathy.clone());
        self.capture.finish_thinking(ticket);

        self.drain_autofill()?;
        if self.resolver_is_complete() {
            let submission = self.finalize().await;
            return Ok(TurnOutcome::Completed {
                transcript: transcript_text,
                sympathy,
                submission,
            });
        }

        self.present_current();
        Ok(TurnOutcome::Advanced {
            transcript: transcript_text,
            sympathy,
        })
    }

    /// Re-sends the retained answer batch after a submission failure.
    /// No-op when nothing is pending. The batch is identical on every
    /// retry, which is what makes the backend contract idempotent.
    pub async fn retry_submission(&mut self) -> Result<(), ClientError> {
        let Some(batch) = self.pending_batch.clone() else {
            return Ok(());
        };
        self.backend.submit_answers(&batch).await?;
        self.pending_batch = None;
        Ok(())
    }

    /// True when a submission failure left a batch awaiting retry.
    pub fn pending_submission(&self) -> bool {
        self.pending_batch.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn survey_id(&self) -> &str {
        &self.survey_id
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn capture_phase(&self) -> CapturePhase {
        self.capture.phase()
    }

    /// The ordered transcript so far.
    pub fn records(&self) -> &[TurnRecord] {
        self.transcript.records()
    }

    /// Display text of the question the conversation is currently on.
    pub fn current_question(&self) -> Option<String> {
        self.resolver
            .as_ref()
            .and_then(|r| r.current())
            .map(|p| p.display_text())
    }

    fn resolver_is_complete(&self) -> bool {
        self.resolver.as_ref().is_some_and(|r| r.is_complete())
    }

    /// Answers autofilled questions at the front of the plan without
    /// recording: the pre-filled value is taken as-is and the empathic
    /// remark is skipped.
    fn drain_autofill(&mut self) -> Result<(), SessionError> {
        let resolver = self.resolver.as_mut().ok_or(SessionError::NotStarted)?;
        loop {
            let (id, display, raw, normalized) = {
                let Some(planned) = resolver.current() else { break };
                let question = &planned.question;
                if !(question.autofill && question.has_prefilled_answer()) {
                    break;
                }
                let Some(normalized) = validator::normalize(question, "") else {
                    break;
                };
                let raw = if question.raw_answer.trim().is_empty() {
                    normalized.clone()
                } else {
                    question.raw_answer.clone()
                };
                (question.id.clone(), planned.display_text(), raw, normalized)
            };

            tracing::debug!(question = %id, "answering autofilled question from pre-filled value");
            self.transcript.push_question(display);
            self.transcript.push_user_answer(raw.clone());
            resolver.record_answer(Answer::new(id, raw, normalized))?;
        }
        Ok(())
    }

    /// Emits the `question` record for the current plan position and opens
    /// the capture machine for it.
    fn present_current(&mut self) {
        let Some(resolver) = self.resolver.as_ref() else {
            return;
        };
        if let Some(planned) = resolver.current() {
            let text = planned.display_text();
            self.transcript.push_question(text);
            self.capture.set_question_available(true);
        }
    }

    /// Terminal bookkeeping once the plan is exhausted: completion record,
    /// status and duration updates (best-effort), then the batch submission.
    /// A failed submission retains the batch; nothing already recorded is
    /// discarded.
    async fn finalize(&mut self) -> Result<(), ClientError> {
        self.completed = true;
        self.capture.mark_completed();
        self.capture.set_question_available(false);
        self.transcript.push_completion(COMPLETION_MESSAGE);

        if let Err(e) = self
            .backend
            .update_status(&self.survey_id, SurveyStatus::Completed)
            .await
        {
            tracing::warn!(error = %e, "failed to update survey status");
        }

        let elapsed_secs = self
            .started_at
            .map(|t| t.elapsed().as_secs() as i64)
            .unwrap_or(0);
        if let Err(e) = self
            .backend
            .update_duration(&self.survey_id, elapsed_secs)
            .await
        {
            tracing::warn!(error = %e, "failed to report completion duration");
        }

        let batch = self.build_batch();
        match self.backend.submit_answers(&batch).await {
            Ok(()) => {
                self.pending_batch = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "answer submission failed, batch retained for retry");
                self.pending_batch = Some(batch);
                Err(e)
            }
        }
    }

    fn build_batch(&self) -> AnswerBatch {
        let questions_with_ans = self
            .resolver
            .as_ref()
            .map(|resolver| {
                resolver
                    .answered()
                    .into_iter()
                    .map(|(planned, answer)| {
                        AnsweredQuestion::from_answer(&planned.question, answer)
                    })
                    .collect()
            })
            .unwrap_or_default();

        AnswerBatch {
            survey_id: self.survey_id.clone(),
            questions_with_ans,
        }
    }
}
