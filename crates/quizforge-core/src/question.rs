//! Question model and its validation predicates.
//!
//! A question is one shape shared by every question type; the type-specific
//! parts (selection limits for multi-select) live in [`QuestionKind`].

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};

/// Opaque question identifier.
pub type QuestionId = Uuid;

/// A set of option indices. Ordering never matters for grading.
pub type AnswerSet = BTreeSet<usize>;

/// Options given to new single-choice and multi-select questions.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Allowed option count for single-choice and multi-select questions.
pub const CHOICE_OPTION_RANGE: RangeInclusive<usize> = 2..=6;

/// The three supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    SingleChoice,
    MultiSelect,
    TrueFalse,
}

impl QuestionType {
    /// How many options a question of this type may carry.
    pub fn option_range(self) -> RangeInclusive<usize> {
        match self {
            QuestionType::TrueFalse => 2..=2,
            QuestionType::SingleChoice | QuestionType::MultiSelect => CHOICE_OPTION_RANGE,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::SingleChoice => write!(f, "single-choice"),
            QuestionType::MultiSelect => write!(f, "multi-select"),
            QuestionType::TrueFalse => write!(f, "true-false"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-choice" | "single" => Ok(QuestionType::SingleChoice),
            "multi-select" | "multi" => Ok(QuestionType::MultiSelect),
            "true-false" | "bool" => Ok(QuestionType::TrueFalse),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Type tag plus the data only some types carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    SingleChoice,
    MultiSelect {
        min_selections: usize,
        max_selections: usize,
    },
    TrueFalse,
}

impl QuestionKind {
    /// Default kind for a freshly created question with `option_count` options.
    pub fn defaults_for(question_type: QuestionType, option_count: usize) -> Self {
        match question_type {
            QuestionType::SingleChoice => QuestionKind::SingleChoice,
            QuestionType::MultiSelect => QuestionKind::MultiSelect {
                min_selections: 1,
                max_selections: option_count.max(1),
            },
            QuestionType::TrueFalse => QuestionKind::TrueFalse,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::SingleChoice => QuestionType::SingleChoice,
            QuestionKind::MultiSelect { .. } => QuestionType::MultiSelect,
            QuestionKind::TrueFalse => QuestionType::TrueFalse,
        }
    }
}

/// Informational difficulty rating. Never affects scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A single assessable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answers: AnswerSet,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    1
}

/// Option labels every true-false question carries.
pub fn true_false_options() -> Vec<String> {
    vec!["True".to_string(), "False".to_string()]
}

impl Question {
    /// A new question with the defaults for `question_type`.
    pub fn new(question_type: QuestionType) -> Self {
        Self::with_option_count(question_type, DEFAULT_OPTION_COUNT)
    }

    /// Like [`Question::new`], with a custom number of blank options for the
    /// choice types. True-false questions always get "True"/"False".
    pub fn with_option_count(question_type: QuestionType, option_count: usize) -> Self {
        let options = default_options(question_type, option_count);
        Self {
            id: Uuid::new_v4(),
            kind: QuestionKind::defaults_for(question_type, options.len()),
            prompt: String::new(),
            options,
            correct_answers: AnswerSet::new(),
            explanation: None,
            difficulty: Difficulty::default(),
            points: default_points(),
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// How many options a test-taker is expected to pick.
    pub fn selection_limits(&self) -> RangeInclusive<usize> {
        match self.kind {
            QuestionKind::SingleChoice | QuestionKind::TrueFalse => 1..=1,
            QuestionKind::MultiSelect {
                min_selections,
                max_selections,
            } => min_selections..=max_selections,
        }
    }

    /// Every field-level problem with this question. Empty means valid.
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        if self.prompt.trim().is_empty() {
            issues.push(Issue::new(Field::Prompt, "prompt is empty"));
        }

        let range = self.question_type().option_range();
        if !range.contains(&self.options.len()) {
            let message = if range.start() == range.end() {
                format!(
                    "{} questions need exactly {} options, found {}",
                    self.question_type(),
                    range.start(),
                    self.options.len()
                )
            } else {
                format!(
                    "{} questions need between {} and {} options, found {}",
                    self.question_type(),
                    range.start(),
                    range.end(),
                    self.options.len()
                )
            };
            issues.push(Issue::new(Field::Options, message));
        }

        for (index, option) in self.options.iter().enumerate() {
            if option.trim().is_empty() {
                issues.push(Issue::new(Field::Options, format!("option {index} is blank")));
            }
        }

        if self.points == 0 {
            issues.push(Issue::new(Field::Points, "points must be at least 1"));
        }

        issues.extend(self.selection_issues());
        issues.extend(self.correct_answer_issues(&self.correct_answers));
        issues
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Problems with `answers` as this question's correct-answer set.
    pub fn correct_answer_issues(&self, answers: &AnswerSet) -> Vec<Issue> {
        let mut issues = Vec::new();

        if answers.is_empty() {
            issues.push(Issue::new(
                Field::CorrectAnswers,
                "no correct answer selected",
            ));
            return issues;
        }

        for &index in answers.range(self.options.len()..) {
            issues.push(Issue::new(
                Field::CorrectAnswers,
                format!(
                    "correct answer {index} is out of range ({} options)",
                    self.options.len()
                ),
            ));
        }

        match self.kind {
            QuestionKind::SingleChoice | QuestionKind::TrueFalse => {
                if answers.len() != 1 {
                    issues.push(Issue::new(
                        Field::CorrectAnswers,
                        format!(
                            "{} questions need exactly one correct answer, found {}",
                            self.question_type(),
                            answers.len()
                        ),
                    ));
                }
            }
            QuestionKind::MultiSelect {
                min_selections,
                max_selections,
            } => {
                if !(min_selections..=max_selections).contains(&answers.len()) {
                    issues.push(Issue::new(
                        Field::CorrectAnswers,
                        format!(
                            "multi-select questions need between {min_selections} and \
                             {max_selections} correct answers, found {}",
                            answers.len()
                        ),
                    ));
                }
            }
        }

        issues
    }

    fn selection_issues(&self) -> Vec<Issue> {
        let QuestionKind::MultiSelect {
            min_selections,
            max_selections,
        } = self.kind
        else {
            return Vec::new();
        };

        let mut issues = Vec::new();
        if min_selections < 1 {
            issues.push(Issue::new(
                Field::Selections,
                "minimum selections must be at least 1",
            ));
        }
        if min_selections > max_selections {
            issues.push(Issue::new(
                Field::Selections,
                format!(
                    "minimum selections ({min_selections}) exceeds maximum ({max_selections})"
                ),
            ));
        }
        if max_selections > self.options.len() {
            issues.push(Issue::new(
                Field::Selections,
                format!(
                    "maximum selections ({max_selections}) exceeds option count ({})",
                    self.options.len()
                ),
            ));
        }
        issues
    }

    /// Reject a selection that references an option this question lacks.
    pub fn check_selection(&self, selected: &AnswerSet) -> Result<()> {
        match selected.range(self.options.len()..).next() {
            Some(&index) => Err(EngineError::BoundsViolation {
                question_id: self.id,
                index,
                option_count: self.options.len(),
            }),
            None => Ok(()),
        }
    }

    /// Reject a non-empty selection whose size falls outside
    /// [`selection_limits`](Self::selection_limits). An empty selection
    /// clears the answer and always passes.
    pub fn check_selection_count(&self, selected: &AnswerSet) -> Result<()> {
        let limits = self.selection_limits();
        if selected.is_empty() || limits.contains(&selected.len()) {
            return Ok(());
        }
        Err(EngineError::SelectionCount {
            question_id: self.id,
            selected: selected.len(),
            min: *limits.start(),
            max: *limits.end(),
        })
    }
}

fn default_options(question_type: QuestionType, option_count: usize) -> Vec<String> {
    match question_type {
        QuestionType::TrueFalse => true_false_options(),
        QuestionType::SingleChoice | QuestionType::MultiSelect => {
            vec![String::new(); option_count]
        }
    }
}

/// The field an [`Issue`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    // question fields
    Prompt,
    Options,
    CorrectAnswers,
    Selections,
    Points,
    // quiz fields
    Id,
    Title,
    Questions,
    PassingGrade,
    TimeLimit,
    MaxAttempts,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Prompt => "prompt",
            Field::Options => "options",
            Field::CorrectAnswers => "correct_answers",
            Field::Selections => "selections",
            Field::Points => "points",
            Field::Id => "id",
            Field::Title => "title",
            Field::Questions => "questions",
            Field::PassingGrade => "passing_grade",
            Field::TimeLimit => "time_limit",
            Field::MaxAttempts => "max_attempts",
        };
        f.write_str(name)
    }
}

/// One field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub field: Field,
    pub message: String,
}

impl Issue {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(indices: &[usize]) -> AnswerSet {
        indices.iter().copied().collect()
    }

    fn single_choice() -> Question {
        let mut q = Question::new(QuestionType::SingleChoice);
        q.prompt = "Which port does HTTPS use?".into();
        q.options = vec!["21".into(), "80".into(), "443".into()];
        q.correct_answers = answers(&[2]);
        q
    }

    fn multi_select(min: usize, max: usize) -> Question {
        let mut q = Question::new(QuestionType::MultiSelect);
        q.kind = QuestionKind::MultiSelect {
            min_selections: min,
            max_selections: max,
        };
        q.prompt = "Which of these are primary colours?".into();
        q.options = vec!["Red".into(), "Green".into(), "Blue".into(), "Purple".into()];
        q.correct_answers = answers(&[0, 2]);
        q
    }

    fn fields(issues: &[Issue]) -> Vec<Field> {
        issues.iter().map(|i| i.field).collect()
    }

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::MultiSelect.to_string(), "multi-select");
        assert_eq!(
            "true-false".parse::<QuestionType>().unwrap(),
            QuestionType::TrueFalse
        );
        assert_eq!(
            "Single".parse::<QuestionType>().unwrap(),
            QuestionType::SingleChoice
        );
        assert!("essay".parse::<QuestionType>().is_err());
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn new_questions_get_type_defaults() {
        let tf = Question::new(QuestionType::TrueFalse);
        assert_eq!(tf.options, vec!["True", "False"]);
        assert_eq!(tf.points, 1);
        assert!(tf.correct_answers.is_empty());

        let multi = Question::new(QuestionType::MultiSelect);
        assert_eq!(multi.options.len(), DEFAULT_OPTION_COUNT);
        assert!(multi.options.iter().all(String::is_empty));
        assert_eq!(multi.selection_limits(), 1..=4);
    }

    #[test]
    fn valid_questions_have_no_issues() {
        assert_eq!(single_choice().validate(), vec![]);
        assert_eq!(multi_select(1, 2).validate(), vec![]);

        let mut tf = Question::new(QuestionType::TrueFalse);
        tf.prompt = "The sky is green.".into();
        tf.correct_answers = answers(&[1]);
        assert!(tf.is_valid());
    }

    #[test]
    fn empty_correct_answers_is_reported() {
        for question_type in [
            QuestionType::SingleChoice,
            QuestionType::MultiSelect,
            QuestionType::TrueFalse,
        ] {
            let mut q = Question::new(question_type);
            q.prompt = "Prompt".into();
            q.options = vec!["a".into(), "b".into()];
            q.kind = QuestionKind::defaults_for(question_type, 2);
            let issues = q.validate();
            assert!(
                fields(&issues).contains(&Field::CorrectAnswers),
                "{question_type}: {issues:?}"
            );
        }
    }

    #[test]
    fn fresh_question_reports_every_problem_at_once() {
        let q = Question::new(QuestionType::SingleChoice);
        let issues = q.validate();
        let fields = fields(&issues);
        assert!(fields.contains(&Field::Prompt));
        assert!(fields.contains(&Field::CorrectAnswers));
        // four blank options
        assert_eq!(fields.iter().filter(|f| **f == Field::Options).count(), 4);
    }

    #[test]
    fn option_count_limits() {
        let mut q = single_choice();
        q.options = vec!["only".into()];
        q.correct_answers = answers(&[0]);
        assert!(q.validate()[0].message.contains("between 2 and 6"));

        q.options = (0..7).map(|i| format!("option {i}")).collect();
        assert_eq!(fields(&q.validate()), vec![Field::Options]);

        let mut tf = Question::new(QuestionType::TrueFalse);
        tf.prompt = "Prompt".into();
        tf.options.push("Maybe".into());
        tf.correct_answers = answers(&[0]);
        assert!(tf.validate()[0].message.contains("exactly 2"));
    }

    #[test]
    fn single_choice_needs_exactly_one_answer() {
        let mut q = single_choice();
        q.correct_answers = answers(&[0, 2]);
        let issues = q.validate();
        assert_eq!(fields(&issues), vec![Field::CorrectAnswers]);
        assert!(issues[0].message.contains("exactly one"));
    }

    #[test]
    fn correct_answer_out_of_range() {
        let mut q = single_choice();
        q.correct_answers = answers(&[3]);
        let issues = q.validate();
        assert!(issues[0].message.contains("out of range"));
    }

    #[test]
    fn multi_select_cardinality_and_limits() {
        let mut q = multi_select(1, 1);
        assert!(q.validate()[0].message.contains("between 1 and 1"));

        q = multi_select(3, 2);
        assert!(fields(&q.validate()).contains(&Field::Selections));

        q = multi_select(0, 2);
        assert!(fields(&q.validate()).contains(&Field::Selections));

        q = multi_select(1, 5);
        let issues = q.validate();
        assert_eq!(fields(&issues), vec![Field::Selections]);
        assert!(issues[0].message.contains("exceeds option count"));
    }

    #[test]
    fn zero_points_is_invalid() {
        let mut q = single_choice();
        q.points = 0;
        assert_eq!(fields(&q.validate()), vec![Field::Points]);
    }

    #[test]
    fn selection_bounds_check() {
        let q = single_choice();
        assert!(q.check_selection(&answers(&[0, 2])).is_ok());
        assert!(q.check_selection(&AnswerSet::new()).is_ok());
        assert_eq!(
            q.check_selection(&answers(&[1, 3, 9])),
            Err(EngineError::BoundsViolation {
                question_id: q.id,
                index: 3,
                option_count: 3,
            })
        );
    }

    #[test]
    fn selection_count_check() {
        let q = single_choice();
        assert!(q.check_selection_count(&answers(&[2])).is_ok());
        assert!(q.check_selection_count(&AnswerSet::new()).is_ok());
        assert_eq!(
            q.check_selection_count(&answers(&[0, 1])),
            Err(EngineError::SelectionCount {
                question_id: q.id,
                selected: 2,
                min: 1,
                max: 1,
            })
        );

        let q = multi_select(2, 3);
        assert!(q.check_selection_count(&answers(&[0, 2])).is_ok());
        assert!(q.check_selection_count(&answers(&[0, 1, 2])).is_ok());
        assert!(q.check_selection_count(&answers(&[1])).is_err());
        let err = q.check_selection_count(&answers(&[0, 1, 2, 3])).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            format!("question {} takes 2 to 3 selection(s), got 4", q.id)
        );
    }

    #[test]
    fn question_serde_uses_type_tag() {
        let q = multi_select(1, 2);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "multi-select");
        assert_eq!(json["min_selections"], 1);
        assert_eq!(json["max_selections"], 2);

        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }
}
