//! Attempt state machine.
//!
//! One user's run through a published quiz:
//!
//! ```text
//! NotStarted -> InProgress -> Submitted -> Graded
//!       \            \
//!        +------------+--> Abandoned
//! ```
//!
//! Submission always grades immediately, so `Submitted` is only observable
//! from inside the transition. Navigation moves a presentation cursor and
//! never changes the status.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::grading::{grade, GradingResult};
use crate::question::{AnswerSet, Question, QuestionId};
use crate::quiz::{PublishedQuiz, QuizId};

/// Lifecycle state of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptStatus {
    NotStarted,
    InProgress,
    Submitted,
    Graded,
    Abandoned,
}

impl AttemptStatus {
    /// `Graded` and `Abandoned` accept no further actions.
    pub fn is_terminal(self) -> bool {
        matches!(self, AttemptStatus::Graded | AttemptStatus::Abandoned)
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptStatus::NotStarted => write!(f, "not started"),
            AttemptStatus::InProgress => write!(f, "in progress"),
            AttemptStatus::Submitted => write!(f, "submitted"),
            AttemptStatus::Graded => write!(f, "graded"),
            AttemptStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// An action a caller can attempt; named in state conflict errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptAction {
    Start,
    Answer,
    Submit,
    Abandon,
}

impl fmt::Display for AttemptAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptAction::Start => write!(f, "start"),
            AttemptAction::Answer => write!(f, "answer"),
            AttemptAction::Submit => write!(f, "submit"),
            AttemptAction::Abandon => write!(f, "abandon"),
        }
    }
}

/// Why an attempt was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitReason {
    Manual,
    TimeLimit,
}

impl fmt::Display for SubmitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitReason::Manual => write!(f, "manual"),
            SubmitReason::TimeLimit => write!(f, "time limit"),
        }
    }
}

/// What a call to [`Attempt::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// This call submitted and graded the attempt.
    Graded(GradingResult),
    /// The attempt was already submitted; nothing happened.
    AlreadySubmitted,
}

/// What a call to [`Attempt::tick`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time advanced; `remaining_secs` is `None` for untimed quizzes.
    Running { remaining_secs: Option<u32> },
    /// This tick reached the time limit and graded the attempt.
    Expired(GradingResult),
    /// The attempt is not in progress; the tick was dropped.
    Ignored,
}

/// One user's run through a published quiz.
#[derive(Debug, Clone)]
pub struct Attempt {
    id: Uuid,
    quiz: PublishedQuiz,
    status: AttemptStatus,
    started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    answers: HashMap<QuestionId, AnswerSet>,
    /// Canonical question indices in the order they are shown.
    presentation: Vec<usize>,
    cursor: usize,
    elapsed_secs: u32,
    submit_reason: Option<SubmitReason>,
    result: Option<GradingResult>,
}

impl Attempt {
    pub fn new(quiz: PublishedQuiz) -> Self {
        let presentation = (0..quiz.questions.len()).collect();
        Self {
            id: Uuid::new_v4(),
            quiz,
            status: AttemptStatus::NotStarted,
            started_at: None,
            submitted_at: None,
            answers: HashMap::new(),
            presentation,
            cursor: 0,
            elapsed_secs: 0,
            submit_reason: None,
            result: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz(&self) -> &PublishedQuiz {
        &self.quiz
    }

    pub fn quiz_id(&self) -> QuizId {
        self.quiz.id
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn submit_reason(&self) -> Option<SubmitReason> {
        self.submit_reason
    }

    pub fn answers(&self) -> &HashMap<QuestionId, AnswerSet> {
        &self.answers
    }

    pub fn answer_for(&self, question_id: QuestionId) -> Option<&AnswerSet> {
        self.answers.get(&question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    /// Seconds left before auto-submission, floored at 0. `None` if untimed.
    pub fn remaining_secs(&self) -> Option<u32> {
        self.quiz
            .time_limit_secs
            .map(|limit| limit.saturating_sub(self.elapsed_secs))
    }

    /// The grading result, once graded.
    pub fn result(&self) -> Option<&GradingResult> {
        self.result.as_ref()
    }

    /// Question ids in presentation order.
    pub fn presentation_order(&self) -> Vec<QuestionId> {
        self.presentation
            .iter()
            .map(|&i| self.quiz.questions[i].id)
            .collect()
    }

    /// Start the attempt, shuffling presentation order if the quiz asks for it.
    pub fn start(&mut self) -> Result<()> {
        self.start_with_rng(&mut rand::thread_rng())
    }

    /// Like [`Attempt::start`] with a caller-supplied random source.
    pub fn start_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.require(AttemptStatus::NotStarted, AttemptAction::Start)?;

        if self.quiz.randomize_question_order {
            self.presentation.shuffle(rng);
        }
        self.started_at = Some(Utc::now());
        self.status = AttemptStatus::InProgress;
        tracing::debug!(attempt = %self.id, quiz = %self.quiz.id, "attempt started");
        Ok(())
    }

    /// Record the selection for a question, replacing any earlier one. An
    /// empty selection clears the answer.
    pub fn answer(
        &mut self,
        question_id: QuestionId,
        selected: impl IntoIterator<Item = usize>,
    ) -> Result<()> {
        self.require(AttemptStatus::InProgress, AttemptAction::Answer)?;

        let question = self
            .quiz
            .question(question_id)
            .ok_or(EngineError::UnknownQuestion(question_id))?;
        let selected: AnswerSet = selected.into_iter().collect();
        if let Err(e) = question.check_selection(&selected) {
            tracing::warn!(attempt = %self.id, "rejected answer: {e}");
            return Err(e);
        }

        if selected.is_empty() {
            self.answers.remove(&question_id);
        } else {
            self.answers.insert(question_id, selected);
        }
        Ok(())
    }

    /// Answer the question under the presentation cursor.
    pub fn answer_current(&mut self, selected: impl IntoIterator<Item = usize>) -> Result<()> {
        match self.current_question().map(|q| q.id) {
            Some(id) => self.answer(id, selected),
            // a published quiz always has a question under the cursor
            None => Err(EngineError::StateConflict {
                action: AttemptAction::Answer,
                status: self.status,
            }),
        }
    }

    /// Advance attempt time by one second, auto-submitting when the time
    /// limit is reached. Ticks outside `InProgress` are dropped.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != AttemptStatus::InProgress {
            return TickOutcome::Ignored;
        }

        self.elapsed_secs = self.elapsed_secs.saturating_add(1);

        match self.quiz.time_limit_secs {
            Some(limit) if self.elapsed_secs >= limit => {
                tracing::debug!(attempt = %self.id, "time limit of {limit}s reached");
                TickOutcome::Expired(self.finish(SubmitReason::TimeLimit))
            }
            _ => TickOutcome::Running {
                remaining_secs: self.remaining_secs(),
            },
        }
    }

    /// Submit and grade the attempt. Submitting an attempt that is already
    /// submitted or graded is a no-op.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        match self.status {
            AttemptStatus::InProgress => Ok(SubmitOutcome::Graded(
                self.finish(SubmitReason::Manual),
            )),
            AttemptStatus::Submitted | AttemptStatus::Graded => {
                tracing::debug!(attempt = %self.id, "duplicate submit ignored");
                Ok(SubmitOutcome::AlreadySubmitted)
            }
            AttemptStatus::NotStarted | AttemptStatus::Abandoned => {
                Err(self.conflict(AttemptAction::Submit))
            }
        }
    }

    /// Give up on the attempt. It is never graded.
    pub fn abandon(&mut self) -> Result<()> {
        match self.status {
            AttemptStatus::NotStarted | AttemptStatus::InProgress => {
                self.status = AttemptStatus::Abandoned;
                tracing::debug!(attempt = %self.id, "attempt abandoned");
                Ok(())
            }
            _ => Err(self.conflict(AttemptAction::Abandon)),
        }
    }

    fn finish(&mut self, reason: SubmitReason) -> GradingResult {
        self.status = AttemptStatus::Submitted;
        self.submitted_at = Some(Utc::now());
        self.submit_reason = Some(reason);

        let result = grade(&self.quiz, self);
        tracing::info!(
            attempt = %self.id,
            quiz = %self.quiz.id,
            reason = %reason,
            "graded {}/{} ({}%), {}",
            result.points_earned,
            result.total_points,
            result.percentage,
            if result.passed { "passed" } else { "failed" }
        );

        self.result = Some(result.clone());
        self.status = AttemptStatus::Graded;
        result
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// Cursor position within the presentation order.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn question_count(&self) -> usize {
        self.presentation.len()
    }

    /// The question under the cursor.
    pub fn current_question(&self) -> Option<&Question> {
        self.presentation
            .get(self.cursor)
            .map(|&i| &self.quiz.questions[i])
    }

    /// Move to the next question. Returns `false` at the last question.
    pub fn next(&mut self) -> bool {
        self.go_to(self.cursor + 1)
    }

    /// Move to the previous question. Returns `false` at the first question.
    pub fn previous(&mut self) -> bool {
        match self.cursor.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    /// Jump to a presentation position. Returns `false` if out of range.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.presentation.len() {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    fn require(&self, expected: AttemptStatus, action: AttemptAction) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(self.conflict(action))
        }
    }

    fn conflict(&self, action: AttemptAction) -> EngineError {
        tracing::warn!(attempt = %self.id, "cannot {action}: attempt is {}", self.status);
        EngineError::StateConflict {
            action,
            status: self.status,
        }
    }
}
