//! Append-only conversation transcript log.
//!
//! One record per conversational event, in strict chronological order, each
//! carrying a monotonically increasing sequence number assigned here. The
//! log is write-once: records are never reordered or removed. Rendering
//! layers consume [`TranscriptLog::records`] and key by `seq`.

use canvass_types::{TurnKind, TurnRecord};

/// The ordered conversation log for one session.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    records: Vec<TurnRecord>,
    next_seq: u64,
    questions_presented: u32,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `question` record. Presented questions are numbered from 1
    /// in presentation order, spliced children included.
    pub fn push_question(&mut self, display_text: impl Into<String>) -> &TurnRecord {
        self.questions_presented += 1;
        let number = self.questions_presented;
        self.push(TurnKind::Question, display_text.into(), Some(number))
    }

    /// Appends a `user_answer` record for an accepted transcript.
    pub fn push_user_answer(&mut self, text: impl Into<String>) -> &TurnRecord {
        self.push(TurnKind::UserAnswer, text.into(), None)
    }

    /// Appends a `sympathy_response` record.
    pub fn push_sympathy(&mut self, text: impl Into<String>) -> &TurnRecord {
        self.push(TurnKind::SympathyResponse, text.into(), None)
    }

    /// Appends the terminal `completion` record.
    pub fn push_completion(&mut self, text: impl Into<String>) -> &TurnRecord {
        self.push(TurnKind::Completion, text.into(), None)
    }

    /// Appends an informational `message` record (retry prompts, notices).
    pub fn push_message(&mut self, text: impl Into<String>) -> &TurnRecord {
        self.push(TurnKind::Message, text.into(), None)
    }

    fn push(&mut self, kind: TurnKind, text: String, question_number: Option<u32>) -> &TurnRecord {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.push(TurnRecord {
            seq,
            kind,
            text,
            question_number,
        });
        self.records.last().expect("record just pushed")
    }

    /// All records in append order.
    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
