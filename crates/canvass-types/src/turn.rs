//! Conversation turn records.
//!
//! Turn records exist only for ordered reconstruction of the conversational
//! transcript by a rendering layer. They carry no business logic and are
//! never consulted when deciding the next question.

use serde::{Deserialize, Serialize};

/// The kind of a conversation turn record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// A question was presented to the respondent.
    Question,
    /// A transcript was accepted as the respondent's answer.
    UserAnswer,
    /// An empathic acknowledgment shown between turns.
    SympathyResponse,
    /// Terminal record emitted when the traversal plan is exhausted.
    Completion,
    /// Informational text (retry prompts, notices).
    Message,
}

impl TurnKind {
    /// Returns the canonical string label for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::UserAnswer => "user_answer",
            Self::SympathyResponse => "sympathy_response",
            Self::Completion => "completion",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for TurnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the conversation transcript.
///
/// `seq` increases monotonically across a session; the rendering layer sorts
/// and keys by it. Records are append-only and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: TurnKind,
    pub text: String,
    /// Running question number, present on `question` records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_number: Option<u32>,
}
