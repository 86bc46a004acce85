//! Question and answer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Validation criteria attached to a question.
///
/// The backend transports criteria as a free string. The well-known values
/// are mapped to explicit variants; anything else is preserved verbatim in
/// [`Criteria::Other`] so it survives a round trip back to the backend.
/// Unknown criteria validate permissively (non-empty answer) — see
/// `canvass-engine::validator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Criteria {
    /// Answer must match one of the question's categories exactly.
    Categorical,
    /// Answer must be an integer within `[1, scales]`.
    Scale,
    /// Free-form answer; any non-empty text is accepted.
    Open,
    /// Alias of [`Criteria::Open`] used by some templates.
    Text,
    /// A criteria string this engine does not recognise.
    Other(String),
}

impl Criteria {
    /// Parses a backend criteria string. Never fails; unknown values are
    /// preserved in [`Criteria::Other`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "categorical" => Self::Categorical,
            "scale" => Self::Scale,
            "open" => Self::Open,
            "text" => Self::Text,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the canonical wire string for this criteria.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Categorical => "categorical",
            Self::Scale => "scale",
            Self::Open => "open",
            Self::Text => "text",
            Self::Other(raw) => raw,
        }
    }

    /// True for the free-text criteria (`open` and its `text` alias).
    pub fn is_free_text(&self) -> bool {
        matches!(self, Self::Open | Self::Text)
    }
}

impl std::fmt::Display for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Criteria {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Criteria {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// One node of a survey template.
///
/// Questions arrive from the backend as a flat, `order`-keyed list; the
/// branching structure is carried by `parent_id` (the question whose answer
/// unlocks this one) and `parent_category_texts` (the parent categories
/// under which this child appears). The graph resolver derives the nested
/// child map from these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub criteria: Criteria,
    /// Upper bound of a scale question; `0` when not a scale question.
    #[serde(default)]
    pub scales: i64,
    /// Ordered category set; empty unless the question is categorical.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Id of the parent question, absent (or empty) for top-level questions.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Parent category texts under which this child question appears.
    #[serde(default)]
    pub parent_category_texts: Vec<String>,
    /// Sequencing key within the template.
    #[serde(default, alias = "ord")]
    pub order: i64,
    /// Whether the question may be answered from a pre-filled value without
    /// recording. Wire format is `"Yes"` / `"No"`.
    #[serde(default, with = "crate::yes_no")]
    pub autofill: bool,
    /// Pre-filled normalized answer, if the backend already holds one.
    #[serde(default)]
    pub answer: String,
    /// Pre-filled raw transcript matching `answer`.
    #[serde(default)]
    pub raw_answer: String,
}

impl Question {
    /// True when the question has no parent and belongs to the top-level
    /// traversal plan.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.as_deref().is_none_or(str::is_empty)
    }

    /// Upper bound of the scale, present iff the question is a scale question.
    pub fn scale_max(&self) -> Option<i64> {
        (self.criteria == Criteria::Scale && self.scales > 0).then_some(self.scales)
    }

    /// True when a non-empty pre-filled answer is available for autofill.
    pub fn has_prefilled_answer(&self) -> bool {
        !self.answer.trim().is_empty()
    }
}

/// A recorded answer for one question. Immutable once created; restarting a
/// turn replaces the whole record, never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    /// Unprocessed transcription text as heard.
    pub raw_transcript: String,
    /// Canonical value matching the question criteria: digits for scale,
    /// the exact category string for categorical, trimmed text otherwise.
    pub normalized_value: String,
    pub recorded_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(
        question_id: impl Into<String>,
        raw_transcript: impl Into<String>,
        normalized_value: impl Into<String>,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            raw_transcript: raw_transcript.into(),
            normalized_value: normalized_value.into(),
            recorded_at: Utc::now(),
        }
    }
}
