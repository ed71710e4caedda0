//! Aggregate statistics over graded attempts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grading::GradingResult;
use crate::question::QuestionId;
use crate::quiz::{Quiz, QuizId};

/// Statistics for a single quiz across all supplied results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizStatistics {
    pub quiz_id: QuizId,
    /// Number of graded attempts considered.
    pub attempts: usize,
    /// Fraction of attempts that passed, in `0.0..=1.0`.
    pub pass_rate: f64,
    pub mean_percentage: f64,
    pub best_percentage: u32,
    pub mean_time_secs: f64,
    /// One entry per question, in canonical order.
    pub per_question: Vec<QuestionStatistics>,
}

/// How often one question was answered correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStatistics {
    pub question_id: QuestionId,
    /// Attempts that selected anything for this question.
    pub answered: usize,
    pub correct: usize,
    /// `correct / attempts`, unanswered counting as wrong.
    pub correct_rate: f64,
}

impl QuizStatistics {
    /// Compute statistics for `quiz`. Results for other quizzes are ignored.
    pub fn compute(quiz: &Quiz, results: &[GradingResult]) -> Self {
        let results: Vec<&GradingResult> =
            results.iter().filter(|r| r.quiz_id == quiz.id).collect();
        let n = results.len();

        let mut tallies: HashMap<QuestionId, (usize, usize)> = HashMap::new();
        for result in &results {
            for outcome in &result.per_question {
                let entry = tallies.entry(outcome.question_id).or_default();
                if !outcome.selected.is_empty() {
                    entry.0 += 1;
                }
                if outcome.is_correct {
                    entry.1 += 1;
                }
            }
        }

        let per_question = quiz
            .questions
            .iter()
            .map(|question| {
                let (answered, correct) = tallies.get(&question.id).copied().unwrap_or_default();
                QuestionStatistics {
                    question_id: question.id,
                    answered,
                    correct,
                    correct_rate: ratio(correct, n),
                }
            })
            .collect();

        Self {
            quiz_id: quiz.id,
            attempts: n,
            pass_rate: ratio(results.iter().filter(|r| r.passed).count(), n),
            mean_percentage: mean(results.iter().map(|r| f64::from(r.percentage)), n),
            best_percentage: results.iter().map(|r| r.percentage).max().unwrap_or(0),
            mean_time_secs: mean(results.iter().map(|r| f64::from(r.time_spent_secs)), n),
            per_question,
        }
    }

    /// The question with the lowest correct rate, if any attempts exist.
    pub fn hardest_question(&self) -> Option<&QuestionStatistics> {
        if self.attempts == 0 {
            return None;
        }
        self.per_question
            .iter()
            .min_by(|a, b| a.correct_rate.total_cmp(&b.correct_rate))
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        values.sum::<f64>() / n as f64
    }
}
