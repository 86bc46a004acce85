//! Shared types and constants for the Canvass survey conversation engine.
//!
//! This crate provides the foundational types used across all Canvass crates:
//! the question/answer domain model, the conversation turn record used to
//! reconstruct transcripts, and the wire types exchanged with the survey
//! backend (which uses PascalCase envelope fields and snake_case question
//! rows — both preserved here verbatim via serde renames).
//!
//! No crate in the workspace depends on anything *except* `canvass-types`
//! for cross-cutting type definitions. This keeps the dependency graph
//! clean and prevents circular dependencies.

mod question;
mod turn;
mod wire;

pub use question::{Answer, Criteria, Question};
pub use turn::{TurnKind, TurnRecord};
pub use wire::{
    AnswerBatch, AnsweredQuestion, DurationUpdate, StatusUpdate, SurveyQuestions, SurveyStatus,
    SympathyReply, SympathyRequest,
};

/// Serde helper for the backend's `"Yes"` / `"No"` autofill flag.
///
/// The backend stores and transports autofill as a string column; the domain
/// model uses `bool`. Anything other than an affirmative spelling is `false`.
pub mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(matches!(
            raw.as_deref(),
            Some("Yes") | Some("yes") | Some("true") | Some("1")
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Flag {
        #[serde(default, with = "super::yes_no")]
        autofill: bool,
    }

    #[test]
    fn yes_no_round_trip() {
        let on: Flag = serde_json::from_str(r#"{"autofill":"Yes"}"#).unwrap();
        assert!(on.autofill);
        let off: Flag = serde_json::from_str(r#"{"autofill":"No"}"#).unwrap();
        assert!(!off.autofill);
        let null: Flag = serde_json::from_str(r#"{"autofill":null}"#).unwrap();
        assert!(!null.autofill);

        let json = serde_json::to_string(&Flag { autofill: true }).unwrap();
        assert_eq!(json, r#"{"autofill":"Yes"}"#);
    }

    #[test]
    fn yes_no_unknown_spelling_is_false() {
        let flag: Flag = serde_json::from_str(r#"{"autofill":"maybe"}"#).unwrap();
        assert!(!flag.autofill);
    }
}
