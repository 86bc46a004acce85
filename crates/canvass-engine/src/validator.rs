//! Answer validation and normalization.
//!
//! Pure predicates over a question schema and a candidate transcript. Fuzzy
//! or semantic mapping from free speech to a category is deliberately *not*
//! done here — that is an upstream collaborator's job. This layer only
//! decides exact acceptability and produces the canonical value.

use canvass_types::{Criteria, Question};

/// Returns true when `candidate` satisfies the question's criteria.
///
/// Equivalent to `normalize(question, candidate).is_some()`.
pub fn is_valid(question: &Question, candidate: &str) -> bool {
    normalize(question, candidate).is_some()
}

/// Validates `candidate` against the question and returns the canonical
/// normalized value, or `None` when the candidate is rejected.
///
/// Rules, in order:
///
/// - An autofill question with a non-empty pre-filled answer is always
///   answerable; the pre-filled value wins regardless of the candidate.
/// - An empty or whitespace-only candidate is rejected.
/// - `categorical`: the trimmed candidate must equal one of the categories
///   exactly (case-sensitive).
/// - `scale`: the candidate must carry a leading integer in
///   `[1, scales]`. Leading-integer parsing mirrors the original consumer's
///   `parseInt`, so `"3."` and `"3 out of 5"` both normalize to `"3"`.
/// - `open` / `text`: any non-empty text; normalized to the trimmed form.
/// - Unrecognised criteria fall back to the non-empty rule. Permissive by
///   choice: rejecting would drop answers a template author considered
///   collectable under a criteria this engine predates.
pub fn normalize(question: &Question, candidate: &str) -> Option<String> {
    if question.autofill && question.has_prefilled_answer() {
        return Some(question.answer.trim().to_string());
    }

    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }

    match &question.criteria {
        Criteria::Categorical => question
            .categories
            .iter()
            .find(|category| category.as_str() == trimmed)
            .cloned(),
        Criteria::Scale => {
            let value = leading_int(trimmed)?;
            (value >= 1 && value <= question.scales).then(|| value.to_string())
        }
        Criteria::Open | Criteria::Text | Criteria::Other(_) => Some(trimmed.to_string()),
    }
}

/// Parses the leading integer of a string: optional sign, then a digit run.
/// Anything after the digits is ignored. Returns `None` when the string does
/// not start with an integer.
fn leading_int(s: &str) -> Option<i64> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        &rest[..end]
    };

    if digits.is_empty() {
        return None;
    }

    digits.parse::<i64>().ok().map(|v| if negative { -v } else { v })
}
