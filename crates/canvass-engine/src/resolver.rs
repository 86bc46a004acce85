//! Question graph traversal.
//!
//! The backend delivers a survey template as a flat, `order`-keyed list in
//! which branching is encoded by `parent_id` and `parent_category_texts`.
//! The resolver derives the per-parent child map from those fields, seeds
//! the realized plan with the top-level questions, and splices child
//! branches into the plan as answers are recorded. Children are never
//! realized speculatively: a branch exists in the plan only once its
//! parent's answer selected it.

use std::collections::{HashMap, HashSet};

use canvass_types::{Answer, Question};
use thiserror::Error;

/// Errors raised while recording answers against the traversal plan.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// `record_answer` was called with the plan already exhausted.
    #[error("no active question to record an answer against")]
    NoActiveQuestion,

    /// The answer's question id does not match the active question.
    #[error("answer targets question {got}, but the active question is {expected}")]
    QuestionMismatch { expected: String, got: String },
}

/// A question as it appears in the realized traversal plan.
#[derive(Debug, Clone)]
pub struct PlannedQuestion {
    pub question: Question,
    /// Branch label for spliced children: the parent's display text plus the
    /// category that selected this branch, e.g. `"Satisfied? (No)"`. Absent
    /// on top-level questions.
    pub parent_context: Option<String>,
}

impl PlannedQuestion {
    fn top_level(question: Question) -> Self {
        Self {
            question,
            parent_context: None,
        }
    }

    /// Full display text: `"{parent context} → {question text}"` for spliced
    /// children, the bare question text otherwise.
    pub fn display_text(&self) -> String {
        match &self.parent_context {
            Some(context) => format!("{context} → {}", self.question.text),
            None => self.question.text.clone(),
        }
    }
}

/// Stateful traversal of one survey's question graph.
///
/// Owned exclusively by one session's orchestrator; never shared.
pub struct QuestionGraphResolver {
    plan: Vec<PlannedQuestion>,
    current: usize,
    answers: HashMap<String, Answer>,
    /// parent id → category text → ordered child questions.
    children: HashMap<String, HashMap<String, Vec<Question>>>,
    /// Ids already present in the realized plan.
    realized: HashSet<String>,
}

impl QuestionGraphResolver {
    /// Builds the resolver from the fetched question list. The list is
    /// re-sorted by `order` defensively; the sort is stable so equal keys
    /// keep their fetch order.
    pub fn new(mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| q.order);

        let mut children: HashMap<String, HashMap<String, Vec<Question>>> = HashMap::new();
        let mut plan = Vec::new();

        for question in questions {
            if question.is_top_level() {
                plan.push(PlannedQuestion::top_level(question));
                continue;
            }
            let parent_id = question.parent_id.clone().unwrap_or_default();
            let by_category = children.entry(parent_id).or_default();
            for category in &question.parent_category_texts {
                by_category
                    .entry(category.clone())
                    .or_default()
                    .push(question.clone());
            }
        }

        let realized = plan.iter().map(|p| p.question.id.clone()).collect();

        Self {
            plan,
            current: 0,
            answers: HashMap::new(),
            children,
            realized,
        }
    }

    /// The question the conversation is currently on, or `None` once the
    /// plan is exhausted.
    pub fn current(&self) -> Option<&PlannedQuestion> {
        self.plan.get(self.current)
    }

    /// True once every realized question has been answered and no further
    /// branch expansion is pending.
    pub fn is_complete(&self) -> bool {
        self.current >= self.plan.len()
    }

    /// The realized plan so far. Order-stable: entries are only ever
    /// appended or spliced in, never reordered.
    pub fn planned(&self) -> &[PlannedQuestion] {
        &self.plan
    }

    /// Index of the active question within the realized plan.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The recorded answer for a question, if any.
    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// All recorded answers paired with their planned questions, in plan
    /// order. This is the submission batch source.
    pub fn answered(&self) -> Vec<(&PlannedQuestion, &Answer)> {
        self.plan
            .iter()
            .filter_map(|p| self.answers.get(&p.question.id).map(|a| (p, a)))
            .collect()
    }

    /// Records the answer for the active question and advances the plan.
    ///
    /// When the active question has children registered under the answer's
    /// normalized value, that ordered child sequence is spliced into the
    /// plan immediately after the active index, each child labeled with the
    /// parent's display context. A normalized value matching no branch
    /// appends nothing — branching degrades gracefully, never errors.
    ///
    /// Returns the number of children spliced in.
    pub fn record_answer(&mut self, answer: Answer) -> Result<usize, ResolverError> {
        let active = self.plan.get(self.current).ok_or(ResolverError::NoActiveQuestion)?;
        if active.question.id != answer.question_id {
            return Err(ResolverError::QuestionMismatch {
                expected: active.question.id.clone(),
                got: answer.question_id,
            });
        }

        let context = format!("{} ({})", active.display_text(), answer.normalized_value);
        let branch: Vec<PlannedQuestion> = self
            .children
            .get(&active.question.id)
            .and_then(|by_category| by_category.get(&answer.normalized_value))
            .map(|children| {
                children
                    .iter()
                    .filter(|child| !self.realized.contains(&child.id))
                    .map(|child| PlannedQuestion {
                        question: child.clone(),
                        parent_context: Some(context.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let spliced = branch.len();
        if spliced > 0 {
            tracing::debug!(
                parent = %answer.question_id,
                category = %answer.normalized_value,
                count = spliced,
                "splicing child branch into traversal plan"
            );
            for planned in &branch {
                self.realized.insert(planned.question.id.clone());
            }
            let insert_at = self.current + 1;
            self.plan.splice(insert_at..insert_at, branch);
        }

        self.answers.insert(answer.question_id.clone(), answer);
        self.current += 1;
        Ok(spliced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_types::Criteria;

    fn q(id: &str, text: &str, order: i64) -> Question {
        Question {
            id: id.to_string(),
            text: text.to_string(),
            criteria: Criteria::Open,
            scales: 0,
            categories: Vec::new(),
            parent_id: None,
            parent_category_texts: Vec::new(),
            order,
            autofill: false,
            answer: String::new(),
            raw_answer: String::new(),
        }
    }

    fn categorical(id: &str, text: &str, order: i64, categories: &[&str]) -> Question {
        Question {
            criteria: Criteria::Categorical,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            ..q(id, text, order)
        }
    }

    fn child_of(parent: &str, categories: &[&str], question: Question) -> Question {
        Question {
            parent_id: Some(parent.to_string()),
            parent_category_texts: categories.iter().map(|c| c.to_string()).collect(),
            ..question
        }
    }

    fn answer(question_id: &str, value: &str) -> Answer {
        Answer::new(question_id, value, value)
    }

    #[test]
    fn plan_starts_with_top_level_questions_in_order() {
        let resolver = QuestionGraphResolver::new(vec![
            q("b", "Second", 2),
            q("a", "First", 1),
            child_of("a", &["Yes"], q("c", "Child", 3)),
        ]);

        let ids: Vec<&str> = resolver
            .planned()
            .iter()
            .map(|p| p.question.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(resolver.current().unwrap().question.id, "a");
    }

    #[test]
    fn matching_answer_splices_children_after_current() {
        let resolver_questions = vec![
            categorical("root", "Satisfied?", 1, &["Yes", "No"]),
            q("tail", "Anything else?", 4),
            child_of("root", &["No"], q("why", "What went wrong?", 2)),
            child_of("root", &["No"], q("fix", "How can we improve?", 3)),
        ];
        let mut resolver = QuestionGraphResolver::new(resolver_questions);

        let spliced = resolver.record_answer(answer("root", "No")).unwrap();
        assert_eq!(spliced, 2);

        let ids: Vec<&str> = resolver
            .planned()
            .iter()
            .map(|p| p.question.id.as_str())
            .collect();
        assert_eq!(ids, ["root", "why", "fix", "tail"]);

        // Next current is the first spliced child, not the original sibling.
        assert_eq!(resolver.current().unwrap().question.id, "why");
        assert_eq!(
            resolver.current().unwrap().parent_context.as_deref(),
            Some("Satisfied? (No)")
        );
        assert_eq!(
            resolver.current().unwrap().display_text(),
            "Satisfied? (No) → What went wrong?"
        );
    }

    #[test]
    fn non_matching_answer_leaves_plan_unchanged() {
        let mut resolver = QuestionGraphResolver::new(vec![
            categorical("root", "Satisfied?", 1, &["Yes", "No"]),
            q("tail", "Anything else?", 3),
            child_of("root", &["No"], q("why", "What went wrong?", 2)),
        ]);

        let spliced = resolver.record_answer(answer("root", "Yes")).unwrap();
        assert_eq!(spliced, 0);
        assert_eq!(resolver.planned().len(), 2);
        assert_eq!(resolver.current().unwrap().question.id, "tail");
    }

    #[test]
    fn unexpected_category_value_degrades_gracefully() {
        let mut resolver = QuestionGraphResolver::new(vec![
            categorical("root", "Satisfied?", 1, &["Yes", "No"]),
            child_of("root", &["No"], q("why", "What went wrong?", 2)),
        ]);

        // A value that matches no branch appends nothing and is not an error.
        let spliced = resolver.record_answer(answer("root", "Somewhat")).unwrap();
        assert_eq!(spliced, 0);
        assert!(resolver.is_complete());
    }

    #[test]
    fn nested_branches_realize_level_by_level() {
        let mut resolver = QuestionGraphResolver::new(vec![
            categorical("root", "Satisfied?", 1, &["Yes", "No"]),
            child_of(
                "root",
                &["No"],
                categorical("why", "Was it the service?", 2, &["Yes", "No"]),
            ),
            child_of("why", &["Yes"], q("detail", "Describe the service issue", 3)),
        ]);

        resolver.record_answer(answer("root", "No")).unwrap();
        assert_eq!(resolver.current().unwrap().question.id, "why");

        resolver.record_answer(answer("why", "Yes")).unwrap();
        let detail = resolver.current().unwrap();
        assert_eq!(detail.question.id, "detail");
        assert_eq!(
            detail.display_text(),
            "Satisfied? (No) → Was it the service? (Yes) → Describe the service issue"
        );

        resolver.record_answer(answer("detail", "slow")).unwrap();
        assert!(resolver.is_complete());
    }

    #[test]
    fn duplicate_category_listing_realizes_a_child_once() {
        // A child registered twice under the same category must still appear
        // in the realized plan at most once.
        let mut resolver = QuestionGraphResolver::new(vec![
            categorical("root", "Satisfied?", 1, &["No"]),
            child_of("root", &["No", "No"], q("why", "What went wrong?", 2)),
        ]);

        let spliced = resolver.record_answer(answer("root", "No")).unwrap();
        assert_eq!(spliced, 1);
        let ids: Vec<&str> = resolver
            .planned()
            .iter()
            .map(|p| p.question.id.as_str())
            .collect();
        assert_eq!(ids, ["root", "why"]);
    }

    #[test]
    fn record_answer_rejects_mismatched_question() {
        let mut resolver = QuestionGraphResolver::new(vec![q("a", "First", 1)]);
        let err = resolver.record_answer(answer("b", "hello")).unwrap_err();
        assert!(matches!(err, ResolverError::QuestionMismatch { .. }));
        // The plan did not advance.
        assert_eq!(resolver.current().unwrap().question.id, "a");
    }

    #[test]
    fn record_answer_after_completion_errors() {
        let mut resolver = QuestionGraphResolver::new(vec![q("a", "First", 1)]);
        resolver.record_answer(answer("a", "done")).unwrap();
        assert!(resolver.is_complete());
        let err = resolver.record_answer(answer("a", "again")).unwrap_err();
        assert!(matches!(err, ResolverError::NoActiveQuestion));
    }

    #[test]
    fn answered_returns_plan_order() {
        let mut resolver = QuestionGraphResolver::new(vec![
            categorical("root", "Satisfied?", 1, &["Yes", "No"]),
            q("tail", "Anything else?", 3),
            child_of("root", &["No"], q("why", "What went wrong?", 2)),
        ]);

        resolver.record_answer(answer("root", "No")).unwrap();
        resolver.record_answer(answer("why", "slow service")).unwrap();
        resolver.record_answer(answer("tail", "no")).unwrap();

        let ids: Vec<&str> = resolver
            .answered()
            .iter()
            .map(|(p, _)| p.question.id.as_str())
            .collect();
        assert_eq!(ids, ["root", "why", "tail"]);
    }
}
