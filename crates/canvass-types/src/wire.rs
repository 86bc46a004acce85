//! Wire types for the survey backend API.
//!
//! The backend speaks PascalCase envelope fields (`SurveyId`,
//! `QuestionswithAns`, including that lowercase `w` — preserved as-is) with
//! snake_case question rows. These types pin the exact shapes so that a
//! resubmitted batch is byte-for-byte identical, which is what makes retry
//! idempotence a pure payload-equality contract.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Answer, Question};

/// Response of `GET /api/surveys/{surveyId}/questions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyQuestions {
    #[serde(rename = "SurveyId")]
    pub survey_id: String,
    #[serde(rename = "TemplateName")]
    pub template_name: String,
    #[serde(rename = "Questions", default)]
    pub questions: Vec<Question>,
}

/// One answered question inside an [`AnswerBatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    #[serde(rename = "QueId")]
    pub que_id: String,
    #[serde(rename = "QueText")]
    pub que_text: String,
    #[serde(rename = "QueScale")]
    pub que_scale: i64,
    #[serde(rename = "QueCriteria")]
    pub que_criteria: crate::Criteria,
    #[serde(rename = "QueCategories")]
    pub que_categories: Vec<String>,
    #[serde(rename = "ParentId")]
    pub parent_id: String,
    #[serde(rename = "ParentCategoryTexts")]
    pub parent_category_texts: Vec<String>,
    #[serde(rename = "Order")]
    pub order: i64,
    #[serde(rename = "Ans")]
    pub ans: String,
    #[serde(rename = "RawAns")]
    pub raw_ans: String,
    #[serde(rename = "Autofill", with = "crate::yes_no")]
    pub autofill: bool,
}

impl AnsweredQuestion {
    /// Builds the submission row for a question and its recorded answer.
    pub fn from_answer(question: &Question, answer: &Answer) -> Self {
        Self {
            que_id: question.id.clone(),
            que_text: question.text.clone(),
            que_scale: question.scales,
            que_criteria: question.criteria.clone(),
            que_categories: question.categories.clone(),
            parent_id: question.parent_id.clone().unwrap_or_default(),
            parent_category_texts: question.parent_category_texts.clone(),
            order: question.order,
            ans: answer.normalized_value.clone(),
            raw_ans: answer.raw_transcript.clone(),
            autofill: question.autofill,
        }
    }
}

/// Body of `POST /api/answers/qna` — one batch per completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerBatch {
    #[serde(rename = "SurveyId")]
    pub survey_id: String,
    #[serde(rename = "QuestionswithAns")]
    pub questions_with_ans: Vec<AnsweredQuestion>,
}

/// Survey lifecycle status as the backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyStatus {
    InProgress,
    Completed,
}

impl SurveyStatus {
    /// Returns the backend's canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "In-Progress",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SurveyStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SurveyStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "In-Progress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            other => Err(serde::de::Error::custom(format!(
                "unknown survey status: {other}"
            ))),
        }
    }
}

/// Body of `PATCH /api/surveys/{surveyId}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(rename = "Status")]
    pub status: SurveyStatus,
}

/// Body of `POST /api/surveys/{surveyId}/duration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationUpdate {
    /// Completion duration in whole seconds.
    #[serde(rename = "CompletionDuration")]
    pub completion_duration: i64,
}

/// Body of `POST /api/questions/sympathize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SympathyRequest {
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Response")]
    pub response: String,
}

/// Response of `POST /api/questions/sympathize`.
///
/// The generator replies with either `response` or `message` depending on
/// which service handled the call; both are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SympathyReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SympathyReply {
    /// Returns the usable remark, if any: `response` wins over `message`,
    /// blank strings count as absent.
    pub fn text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Criteria;

    fn question() -> Question {
        Question {
            id: "q-1".to_string(),
            text: "How satisfied are you?".to_string(),
            criteria: Criteria::Scale,
            scales: 5,
            categories: Vec::new(),
            parent_id: None,
            parent_category_texts: Vec::new(),
            order: 1,
            autofill: false,
            answer: String::new(),
            raw_answer: String::new(),
        }
    }

    #[test]
    fn batch_uses_backend_field_names() {
        let answer = Answer::new("q-1", "3.", "3");
        let batch = AnswerBatch {
            survey_id: "s-1".to_string(),
            questions_with_ans: vec![AnsweredQuestion::from_answer(&question(), &answer)],
        };

        let json = serde_json::to_value(&batch).unwrap();
        assert!(json.get("QuestionswithAns").is_some());
        let row = &json["QuestionswithAns"][0];
        assert_eq!(row["QueId"], "q-1");
        assert_eq!(row["QueScale"], 5);
        assert_eq!(row["QueCriteria"], "scale");
        assert_eq!(row["Ans"], "3");
        assert_eq!(row["RawAns"], "3.");
        assert_eq!(row["Autofill"], "No");
        assert_eq!(row["ParentId"], "");
    }

    #[test]
    fn identical_batches_serialize_identically() {
        let answer = Answer::new("q-1", "3", "3");
        let row = AnsweredQuestion::from_answer(&question(), &answer);
        let batch = AnswerBatch {
            survey_id: "s-1".to_string(),
            questions_with_ans: vec![row],
        };
        let first = serde_json::to_string(&batch).unwrap();
        let second = serde_json::to_string(&batch).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn status_spelling_matches_backend() {
        assert_eq!(
            serde_json::to_string(&StatusUpdate {
                status: SurveyStatus::InProgress
            })
            .unwrap(),
            r#"{"Status":"In-Progress"}"#
        );
        assert_eq!(
            serde_json::to_string(&StatusUpdate {
                status: SurveyStatus::Completed
            })
            .unwrap(),
            r#"{"Status":"Completed"}"#
        );
    }

    #[test]
    fn sympathy_reply_prefers_response_over_message() {
        let reply = SympathyReply {
            response: Some("That sounds great!".to_string()),
            message: Some("ignored".to_string()),
        };
        assert_eq!(reply.text(), Some("That sounds great!"));

        let message_only = SympathyReply {
            response: None,
            message: Some("Noted, thank you.".to_string()),
        };
        assert_eq!(message_only.text(), Some("Noted, thank you."));

        let blank = SympathyReply {
            response: Some("   ".to_string()),
            message: None,
        };
        assert_eq!(blank.text(), None);
    }
}
