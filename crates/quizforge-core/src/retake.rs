//! Retake limits.
//!
//! The engine does not store attempts; callers keep the graded results they
//! persisted and hand them back here to decide whether another attempt may
//! begin.

use crate::attempt::Attempt;
use crate::error::{EngineError, Result};
use crate::grading::GradingResult;
use crate::quiz::{PublishedQuiz, QuizId};

/// Completed attempts of one user against one quiz.
#[derive(Debug, Clone)]
pub struct AttemptHistory {
    quiz_id: QuizId,
    max_attempts: u32,
    results: Vec<GradingResult>,
}

impl AttemptHistory {
    pub fn new(quiz: &PublishedQuiz) -> Self {
        Self {
            quiz_id: quiz.id,
            max_attempts: quiz.max_attempts,
            results: Vec::new(),
        }
    }

    /// Rebuild a history from previously stored results. Results for other
    /// quizzes are skipped.
    pub fn from_results(
        quiz: &PublishedQuiz,
        results: impl IntoIterator<Item = GradingResult>,
    ) -> Self {
        let mut history = Self::new(quiz);
        for result in results {
            if result.quiz_id == history.quiz_id {
                history.results.push(result);
            } else {
                tracing::warn!(
                    "skipping result for quiz {} in history of {}",
                    result.quiz_id,
                    history.quiz_id
                );
            }
        }
        history
    }

    pub fn attempts_used(&self) -> u32 {
        u32::try_from(self.results.len()).unwrap_or(u32::MAX)
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts_used())
    }

    pub fn can_start(&self) -> bool {
        self.attempts_remaining() > 0
    }

    pub fn ensure_can_start(&self) -> Result<()> {
        if self.can_start() {
            Ok(())
        } else {
            Err(EngineError::AttemptLimitReached {
                max_attempts: self.max_attempts,
            })
        }
    }

    /// A fresh attempt, if the retake limit allows one.
    pub fn begin(&self, quiz: &PublishedQuiz) -> Result<Attempt> {
        self.ensure_can_start()?;
        Ok(Attempt::new(quiz.clone()))
    }

    /// Record a graded attempt.
    pub fn record(&mut self, result: GradingResult) -> Result<()> {
        self.ensure_can_start()?;
        self.results.push(result);
        Ok(())
    }

    /// Record the result of `attempt`, if it has been graded.
    pub fn record_attempt(&mut self, attempt: &Attempt) -> Result<bool> {
        match attempt.result() {
            Some(result) => self.record(result.clone()).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn results(&self) -> &[GradingResult] {
        &self.results
    }

    /// Highest percentage so far; the earliest wins ties.
    pub fn best_result(&self) -> Option<&GradingResult> {
        self.results
            .iter()
            .rev()
            .max_by_key(|r| r.percentage)
    }

    pub fn latest(&self) -> Option<&GradingResult> {
        self.results.last()
    }

    pub fn has_passed(&self) -> bool {
        self.results.iter().any(|r| r.passed)
    }
}
