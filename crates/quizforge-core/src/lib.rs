//! quizforge-core: quiz authoring, timed attempts, and grading.
//!
//! Quizzes are edited through pure functions in [`authoring`] that return a
//! new [`Quiz`] on every change. [`authoring::publish`] validates a quiz and
//! freezes it into a [`PublishedQuiz`], the only thing an [`Attempt`] can be
//! started from. Attempts are graded deterministically by [`grading`].

pub mod attempt;
pub mod authoring;
pub mod config;
pub mod error;
pub mod feedback;
pub mod grading;
pub mod question;
pub mod quiz;
pub mod retake;
pub mod statistics;
pub mod timer;
pub mod view;

pub use attempt::{Attempt, AttemptStatus, SubmitOutcome, SubmitReason, TickOutcome};
pub use authoring::{QuestionPatch, QuizDraft, QuizPatch};
pub use config::QuizforgeConfig;
pub use error::{EngineError, Result, ValidationFailure};
pub use grading::{GradingResult, QuestionOutcome};
pub use question::{AnswerSet, Difficulty, Question, QuestionId, QuestionKind, QuestionType};
pub use quiz::{FeedbackPolicy, PublishedQuiz, Quiz, QuizId};
pub use retake::AttemptHistory;
pub use statistics::QuizStatistics;
pub use timer::LiveAttempt;
pub use view::AttemptView;
