//! Quiz model: an ordered question list plus grading configuration.

use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::QuizforgeConfig;
use crate::question::{Field, Issue, Question, QuestionId};

/// Opaque quiz identifier.
pub type QuizId = Uuid;

/// When a question's explanation and correct answer are revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackPolicy {
    /// As soon as the question has been answered.
    Immediate,
    /// Only once the attempt has been graded.
    #[default]
    AfterCompletion,
    /// Never; only the score and pass/fail are shown.
    Never,
}

impl fmt::Display for FeedbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackPolicy::Immediate => write!(f, "immediate"),
            FeedbackPolicy::AfterCompletion => write!(f, "after-completion"),
            FeedbackPolicy::Never => write!(f, "never"),
        }
    }
}

impl FromStr for FeedbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immediate" => Ok(FeedbackPolicy::Immediate),
            "after-completion" | "after_completion" => Ok(FeedbackPolicy::AfterCompletion),
            "never" => Ok(FeedbackPolicy::Never),
            other => Err(format!("unknown feedback policy: {other}")),
        }
    }
}

/// An ordered, gradable collection of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Canonical order; also the default presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Minimum percentage needed to pass, 0 to 100.
    #[serde(default = "default_passing_grade")]
    pub passing_grade: u32,
    /// `None` means untimed.
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub feedback_policy: FeedbackPolicy,
    #[serde(default)]
    pub randomize_question_order: bool,
}

fn default_passing_grade() -> u32 {
    70
}

fn default_max_attempts() -> u32 {
    3
}

impl Quiz {
    /// An empty quiz using the built-in defaults.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_defaults(title, &QuizforgeConfig::default())
    }

    /// An empty quiz using the defaults from `config`.
    pub fn with_defaults(title: impl Into<String>, config: &QuizforgeConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            questions: Vec::new(),
            passing_grade: config.passing_grade,
            time_limit_secs: None,
            max_attempts: config.max_attempts,
            feedback_policy: config.feedback_policy,
            randomize_question_order: false,
        }
    }

    /// Sum of every question's points, always derived from `questions`.
    pub fn total_points(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.points)).sum()
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Canonical index of the question with `id`.
    pub fn position(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id).collect()
    }

    pub fn is_timed(&self) -> bool {
        self.time_limit_secs.is_some()
    }

    /// Quiz-level problems: settings out of range, a blank title, no
    /// questions, or duplicate question ids. Question contents are checked by
    /// [`Question::validate`].
    pub fn settings_issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        if self.title.trim().is_empty() {
            issues.push(Issue::new(Field::Title, "title is empty"));
        }
        if self.questions.is_empty() {
            issues.push(Issue::new(Field::Questions, "quiz has no questions"));
        }
        if self.passing_grade > 100 {
            issues.push(Issue::new(
                Field::PassingGrade,
                format!("passing grade {} exceeds 100", self.passing_grade),
            ));
        }
        if self.time_limit_secs == Some(0) {
            issues.push(Issue::new(
                Field::TimeLimit,
                "time limit must be positive when set",
            ));
        }
        if self.max_attempts == 0 {
            issues.push(Issue::new(
                Field::MaxAttempts,
                "max attempts must be at least 1",
            ));
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id) {
                issues.push(Issue::new(
                    Field::Id,
                    format!("duplicate question id: {}", question.id),
                ));
            }
        }

        issues
    }
}

/// A quiz that passed the publish gate.
///
/// Cheap to clone and immutable: attempts hold one of these, so the
/// questions they grade against cannot change underneath them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedQuiz(Arc<Quiz>);

impl PublishedQuiz {
    /// Only the authoring publish gate builds these.
    pub(crate) fn new(quiz: Quiz) -> Self {
        Self(Arc::new(quiz))
    }

    pub fn quiz(&self) -> &Quiz {
        &self.0
    }

    /// A detached, editable copy for authoring a new revision.
    pub fn to_draft(&self) -> Quiz {
        (*self.0).clone()
    }
}

impl Deref for PublishedQuiz {
    type Target = Quiz;

    fn deref(&self) -> &Quiz {
        &self.0
    }
}

impl Serialize for PublishedQuiz {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
