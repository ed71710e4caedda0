//! Feedback visibility.
//!
//! The feedback policy never changes how an attempt is graded. It only
//! decides whether explanations and correct answers may be shown to the
//! test-taker, and when.

use serde::{Deserialize, Serialize};

use crate::attempt::{Attempt, AttemptStatus};
use crate::grading::GradingResult;
use crate::question::{AnswerSet, QuestionId};
use crate::quiz::{FeedbackPolicy, Quiz};

/// Where the test-taker is relative to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStage {
    /// The attempt is running; `answered` is whether this question has a selection.
    Answering { answered: bool },
    /// The attempt has been graded.
    Completed,
}

impl FeedbackPolicy {
    /// Whether explanations and correct answers may be shown at `stage`.
    pub fn reveals(self, stage: FeedbackStage) -> bool {
        match (self, stage) {
            (FeedbackPolicy::Never, _) => false,
            (FeedbackPolicy::Immediate, FeedbackStage::Answering { answered }) => answered,
            (FeedbackPolicy::AfterCompletion, FeedbackStage::Answering { .. }) => false,
            (_, FeedbackStage::Completed) => true,
        }
    }
}

/// Explanation and correct answers for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFeedback {
    pub question_id: QuestionId,
    pub explanation: Option<String>,
    pub correct_answers: AnswerSet,
}

impl Attempt {
    /// Feedback for `question_id` if the quiz's policy allows showing it now.
    pub fn feedback_for(&self, question_id: QuestionId) -> Option<QuestionFeedback> {
        let stage = match self.status() {
            AttemptStatus::InProgress => FeedbackStage::Answering {
                answered: self.answer_for(question_id).is_some(),
            },
            AttemptStatus::Submitted | AttemptStatus::Graded => FeedbackStage::Completed,
            AttemptStatus::NotStarted | AttemptStatus::Abandoned => return None,
        };
        if !self.quiz().feedback_policy.reveals(stage) {
            return None;
        }
        let question = self.quiz().question(question_id)?;
        Some(QuestionFeedback {
            question_id,
            explanation: question.explanation.clone(),
            correct_answers: question.correct_answers.clone(),
        })
    }
}

/// One render-safe row of a graded attempt's review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    /// 1-based canonical position.
    pub number: usize,
    pub question_id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: AnswerSet,
    pub is_correct: bool,
    pub points_awarded: u32,
    pub points_possible: u32,
    /// Withheld when the policy is [`FeedbackPolicy::Never`].
    pub feedback: Option<QuestionFeedback>,
}

/// Build the review of a graded result, withholding explanations and
/// correct answers as the quiz's feedback policy requires.
pub fn review(quiz: &Quiz, result: &GradingResult) -> Vec<ReviewItem> {
    let reveal = quiz.feedback_policy.reveals(FeedbackStage::Completed);

    result
        .per_question
        .iter()
        .enumerate()
        .filter_map(|(index, outcome)| {
            let question = quiz.question(outcome.question_id)?;
            Some(ReviewItem {
                number: index + 1,
                question_id: outcome.question_id,
                prompt: question.prompt.clone(),
                options: question.options.clone(),
                selected: outcome.selected.clone(),
                is_correct: outcome.is_correct,
                points_awarded: outcome.points_awarded,
                points_possible: outcome.points_possible,
                feedback: reveal.then(|| QuestionFeedback {
                    question_id: outcome.question_id,
                    explanation: question.explanation.clone(),
                    correct_answers: outcome.correct.clone(),
                }),
            })
        })
        .collect()
}
