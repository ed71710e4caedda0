//! Render-ready snapshots of an attempt.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attempt::{Attempt, AttemptStatus};
use crate::feedback::QuestionFeedback;
use crate::question::{AnswerSet, QuestionId, QuestionType};
use crate::quiz::QuizId;

/// The question under the cursor, as the test-taker should see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Vec<String>,
    pub points: u32,
    /// Current selection; empty if unanswered.
    pub selected: AnswerSet,
    pub min_selections: usize,
    pub max_selections: usize,
    /// Present only when the feedback policy allows it at this point.
    pub feedback: Option<QuestionFeedback>,
}

/// Everything a front end needs to draw the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptView {
    pub attempt_id: Uuid,
    pub quiz_id: QuizId,
    pub title: String,
    pub status: AttemptStatus,
    /// 0-based cursor position within the presentation order.
    pub position: usize,
    pub question_count: usize,
    pub answered: usize,
    pub elapsed_secs: u32,
    pub remaining_secs: Option<u32>,
    pub current: Option<QuestionView>,
}

impl Attempt {
    pub fn view(&self) -> AttemptView {
        let current = self.current_question().map(|question| {
            let limits = question.selection_limits();
            QuestionView {
                id: question.id,
                question_type: question.question_type(),
                prompt: question.prompt.clone(),
                options: question.options.clone(),
                points: question.points,
                selected: self.answer_for(question.id).cloned().unwrap_or_default(),
                min_selections: *limits.start(),
                max_selections: *limits.end(),
                feedback: self.feedback_for(question.id),
            }
        });

        AttemptView {
            attempt_id: self.id(),
            quiz_id: self.quiz_id(),
            title: self.quiz().title.clone(),
            status: self.status(),
            position: self.cursor(),
            question_count: self.question_count(),
            answered: self.answered_count(),
            elapsed_secs: self.elapsed_secs(),
            remaining_secs: self.remaining_secs(),
            current,
        }
    }
}
