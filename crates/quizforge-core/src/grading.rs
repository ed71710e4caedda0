//! Grading engine.
//!
//! Grading is a pure function of the quiz and the frozen answers. It walks
//! questions in canonical order regardless of how the attempt presented them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attempt::Attempt;
use crate::question::{AnswerSet, Question, QuestionId, QuestionKind};
use crate::quiz::{Quiz, QuizId};

/// How one question scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    /// What the test-taker picked; empty if unanswered.
    pub selected: AnswerSet,
    /// The question's correct answers.
    pub correct: AnswerSet,
    pub is_correct: bool,
    pub points_awarded: u32,
    pub points_possible: u32,
}

/// The graded outcome of one completed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResult {
    pub quiz_id: QuizId,
    /// One entry per question, canonical order.
    pub per_question: Vec<QuestionOutcome>,
    pub points_earned: u64,
    pub total_points: u64,
    /// `round(100 * points_earned / total_points)`.
    pub percentage: u32,
    pub passed: bool,
    pub time_spent_secs: u32,
    pub graded_at: DateTime<Utc>,
}

impl GradingResult {
    pub fn outcome(&self, question_id: QuestionId) -> Option<&QuestionOutcome> {
        self.per_question
            .iter()
            .find(|o| o.question_id == question_id)
    }

    pub fn correct_count(&self) -> usize {
        self.per_question.iter().filter(|o| o.is_correct).count()
    }
}

/// Grade a completed attempt against its quiz.
pub fn grade(quiz: &Quiz, attempt: &Attempt) -> GradingResult {
    grade_answers(quiz, attempt.answers(), attempt.elapsed_secs())
}

/// Grade a raw answer map. Questions missing from `answers` count as
/// unanswered.
pub fn grade_answers(
    quiz: &Quiz,
    answers: &HashMap<QuestionId, AnswerSet>,
    time_spent_secs: u32,
) -> GradingResult {
    let empty = AnswerSet::new();

    let per_question: Vec<QuestionOutcome> = quiz
        .questions
        .iter()
        .map(|question| {
            let selected = answers.get(&question.id).unwrap_or(&empty);
            let is_correct = is_correct(question, selected);
            QuestionOutcome {
                question_id: question.id,
                selected: selected.clone(),
                correct: question.correct_answers.clone(),
                is_correct,
                points_awarded: if is_correct { question.points } else { 0 },
                points_possible: question.points,
            }
        })
        .collect();

    let points_earned: u64 = per_question
        .iter()
        .map(|o| u64::from(o.points_awarded))
        .sum();
    let total_points = quiz.total_points();

    if total_points == 0 {
        // unreachable for published quizzes
        tracing::error!(quiz = %quiz.id, "grading a quiz with zero total points");
    }

    let percentage = percentage(points_earned, total_points);
    GradingResult {
        quiz_id: quiz.id,
        per_question,
        points_earned,
        total_points,
        percentage,
        passed: percentage >= quiz.passing_grade,
        time_spent_secs,
        graded_at: Utc::now(),
    }
}

/// Whether `selected` earns the question's points.
///
/// Every type requires exact set equality with the correct answers. A
/// multi-select answer that overlaps only partially earns nothing; its
/// selection limits bound what may be submitted, they are not credit tiers.
pub fn is_correct(question: &Question, selected: &AnswerSet) -> bool {
    match question.kind {
        QuestionKind::SingleChoice | QuestionKind::TrueFalse => {
            selected.len() == 1 && *selected == question.correct_answers
        }
        QuestionKind::MultiSelect { .. } => *selected == question.correct_answers,
    }
}

/// `round(100 * earned / total)` with halves rounded up; 0 when `total` is 0.
pub fn percentage(earned: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * earned + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
