//! Engine error types.
//!
//! Every failure the engine reports is a structured value the caller can
//! match on. Authoring mistakes carry field-level issues so an editor can
//! highlight all of them at once; attempt misuse carries the state that
//! forbade the action.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attempt::{AttemptAction, AttemptStatus};
use crate::question::{Issue, QuestionId};

/// Result alias used throughout the engine.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// All validation issues for one question, or for the quiz itself when
/// `question_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// The offending question, if the failure is question-scoped.
    pub question_id: Option<QuestionId>,
    /// Every problem found, in field order.
    pub issues: Vec<Issue>,
}

impl ValidationFailure {
    pub fn quiz(issues: Vec<Issue>) -> Self {
        Self {
            question_id: None,
            issues,
        }
    }

    pub fn question(question_id: QuestionId, issues: Vec<Issue>) -> Self {
        Self {
            question_id: Some(question_id),
            issues,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.question_id {
            Some(id) => write!(f, "question {id}: ")?,
            None => write!(f, "quiz: ")?,
        }
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

fn issue_count(failures: &[ValidationFailure]) -> usize {
    failures.iter().map(|f| f.issues.len()).sum()
}

/// Errors reported by authoring operations and the attempt state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// One or more fields failed authoring validation.
    #[error("validation failed with {} issue(s)", issue_count(.0))]
    ValidationFailure(Vec<ValidationFailure>),

    /// The action is not allowed in the attempt's current state.
    #[error("cannot {action} an attempt that is {status}")]
    StateConflict {
        action: AttemptAction,
        status: AttemptStatus,
    },

    /// A reorder request was not a permutation of the quiz's question ids.
    #[error("invalid question order: {0}")]
    InvalidOrder(String),

    /// An answer referenced an option index the question does not have.
    #[error("option {index} is out of range for question {question_id} ({option_count} options)")]
    BoundsViolation {
        question_id: QuestionId,
        index: usize,
        option_count: usize,
    },

    /// A selection picked fewer or more options than the question allows.
    #[error("question {question_id} takes {min} to {max} selection(s), got {selected}")]
    SelectionCount {
        question_id: QuestionId,
        selected: usize,
        min: usize,
        max: usize,
    },

    /// The referenced question is not part of the quiz.
    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),

    /// The quiz's retake limit has been used up.
    #[error("attempt limit reached ({max_attempts} allowed)")]
    AttemptLimitReached { max_attempts: u32 },
}

impl EngineError {
    /// Returns `true` if the author or test-taker can fix the input and retry
    /// the same operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::ValidationFailure(_)
                | EngineError::InvalidOrder(_)
                | EngineError::BoundsViolation { .. }
                | EngineError::SelectionCount { .. }
                | EngineError::UnknownQuestion(_)
        )
    }

    /// Returns `true` for actions attempted against a closed or not yet
    /// started attempt.
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, EngineError::StateConflict { .. })
    }

    /// The validation failures carried by this error, if any.
    pub fn validation_failures(&self) -> Option<&[ValidationFailure]> {
        match self {
            EngineError::ValidationFailure(failures) => Some(failures),
            _ => None,
        }
    }

    pub(crate) fn single_issue(question_id: Option<QuestionId>, issue: Issue) -> Self {
        EngineError::ValidationFailure(vec![ValidationFailure {
            question_id,
            issues: vec![issue],
        }])
    }
}
