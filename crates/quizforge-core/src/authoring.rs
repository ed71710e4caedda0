//! Quiz authoring operations.
//!
//! Every operation takes the current quiz by reference and returns a new
//! value; nothing is edited in place. [`QuizDraft`] layers undo/redo on top
//! for callers that want an editor-style API.

use std::collections::HashSet;

use crate::config::QuizforgeConfig;
use crate::error::{EngineError, Result, ValidationFailure};
use crate::question::{
    true_false_options, AnswerSet, Difficulty, Field, Issue, Question, QuestionId, QuestionKind,
    QuestionType,
};
use crate::quiz::{FeedbackPolicy, PublishedQuiz, Quiz};

/// A partial update to one question. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct QuestionPatch {
    /// Changing the type resets options and correct answers to that type's
    /// defaults before the rest of the patch applies.
    pub question_type: Option<QuestionType>,
    pub prompt: Option<String>,
    pub options: Option<Vec<String>>,
    pub explanation: Option<Option<String>>,
    pub difficulty: Option<Difficulty>,
    pub points: Option<u32>,
    /// `(min, max)` selections; multi-select only.
    pub selection_limits: Option<(usize, usize)>,
}

/// A partial update to quiz-level settings.
#[derive(Debug, Clone, Default)]
pub struct QuizPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub passing_grade: Option<u32>,
    pub time_limit_secs: Option<Option<u32>>,
    pub max_attempts: Option<u32>,
    pub feedback_policy: Option<FeedbackPolicy>,
    pub randomize_question_order: Option<bool>,
}

/// Append a question of `question_type` with default contents.
///
/// Returns the new quiz and the id of the added question.
pub fn add_question(quiz: &Quiz, question_type: QuestionType) -> (Quiz, QuestionId) {
    add_question_with(quiz, question_type, &QuizforgeConfig::default())
}

/// Like [`add_question`], taking the blank option count from `config`.
pub fn add_question_with(
    quiz: &Quiz,
    question_type: QuestionType,
    config: &QuizforgeConfig,
) -> (Quiz, QuestionId) {
    let question = Question::with_option_count(question_type, config.default_option_count);
    let id = question.id;
    let mut next = quiz.clone();
    next.questions.push(question);
    tracing::debug!(quiz = %quiz.id, question = %id, "added {question_type} question");
    (next, id)
}

/// Apply `patch` to the question with `question_id`.
pub fn update_question(quiz: &Quiz, question_id: QuestionId, patch: QuestionPatch) -> Result<Quiz> {
    let mut next = quiz.clone();
    let question = question_mut(&mut next, question_id)?;

    let mut type_changed = false;
    if let Some(question_type) = patch.question_type {
        if question_type != question.question_type() {
            let option_count = match question.question_type() {
                QuestionType::TrueFalse => crate::question::DEFAULT_OPTION_COUNT,
                _ => question.options.len(),
            };
            reset_to_type(question, question_type, option_count);
            type_changed = true;
            tracing::debug!(question = %question_id, "type changed to {question_type}, answers reset");
        }
    }

    if let Some(options) = patch.options {
        let previous_count = question.options.len();
        question.options = options;
        if type_changed {
            question.kind =
                QuestionKind::defaults_for(question.question_type(), question.options.len());
        } else {
            fit_selection_limits(question, previous_count);
        }
    }

    if let Some((min, max)) = patch.selection_limits {
        match &mut question.kind {
            QuestionKind::MultiSelect {
                min_selections,
                max_selections,
            } => {
                *min_selections = min;
                *max_selections = max;
            }
            _ => {
                return Err(EngineError::single_issue(
                    Some(question_id),
                    Issue::new(
                        Field::Selections,
                        "selection limits only apply to multi-select questions",
                    ),
                ));
            }
        }
    }

    if let Some(prompt) = patch.prompt {
        question.prompt = prompt;
    }
    if let Some(explanation) = patch.explanation {
        question.explanation = explanation.filter(|e| !e.trim().is_empty());
    }
    if let Some(difficulty) = patch.difficulty {
        question.difficulty = difficulty;
    }
    if let Some(points) = patch.points {
        question.points = points;
    }

    Ok(next)
}

/// Keep multi-select limits in step with a replaced option list. A maximum
/// that tracked the old option count follows the new one.
fn fit_selection_limits(question: &mut Question, previous_count: usize) {
    let option_count = question.options.len().max(1);
    if let QuestionKind::MultiSelect {
        min_selections,
        max_selections,
    } = &mut question.kind
    {
        if *max_selections == previous_count || *max_selections > option_count {
            *max_selections = option_count;
        }
        *min_selections = (*min_selections).min(*max_selections);
    }
}

fn reset_to_type(question: &mut Question, question_type: QuestionType, option_count: usize) {
    question.options = match question_type {
        QuestionType::TrueFalse => true_false_options(),
        QuestionType::SingleChoice | QuestionType::MultiSelect => vec![String::new(); option_count],
    };
    question.kind = QuestionKind::defaults_for(question_type, question.options.len());
    question.correct_answers.clear();
}

/// Replace the correct-answer set of a question.
///
/// Rejects an empty set, indices outside the option list, and sets that
/// break the type's cardinality rule.
pub fn set_correct_answers(
    quiz: &Quiz,
    question_id: QuestionId,
    indices: impl IntoIterator<Item = usize>,
) -> Result<Quiz> {
    let answers: AnswerSet = indices.into_iter().collect();
    let mut next = quiz.clone();
    let question = question_mut(&mut next, question_id)?;

    let issues = question.correct_answer_issues(&answers);
    if !issues.is_empty() {
        tracing::warn!(question = %question_id, "rejected correct answers {answers:?}");
        return Err(EngineError::ValidationFailure(vec![
            ValidationFailure::question(question_id, issues),
        ]));
    }

    question.correct_answers = answers;
    Ok(next)
}

/// Remove the question with `question_id`.
pub fn remove_question(quiz: &Quiz, question_id: QuestionId) -> Result<Quiz> {
    let index = quiz
        .position(question_id)
        .ok_or(EngineError::UnknownQuestion(question_id))?;
    let mut next = quiz.clone();
    next.questions.remove(index);
    tracing::debug!(quiz = %quiz.id, question = %question_id, "removed question");
    Ok(next)
}

/// Reorder questions to match `new_order`, which must be a permutation of
/// the quiz's current question ids.
pub fn reorder_questions(quiz: &Quiz, new_order: &[QuestionId]) -> Result<Quiz> {
    if new_order.len() != quiz.questions.len() {
        return Err(EngineError::InvalidOrder(format!(
            "expected {} question ids, got {}",
            quiz.questions.len(),
            new_order.len()
        )));
    }

    let mut seen = HashSet::with_capacity(new_order.len());
    for id in new_order {
        if !seen.insert(*id) {
            return Err(EngineError::InvalidOrder(format!("question {id} listed twice")));
        }
    }

    let mut next = quiz.clone();
    next.questions = new_order
        .iter()
        .map(|id| {
            quiz.question(*id)
                .cloned()
                .ok_or_else(|| EngineError::InvalidOrder(format!("question {id} is not in the quiz")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(next)
}

/// Apply quiz-level setting changes. Out-of-range values are accepted here
/// and reported by [`validate_quiz`].
pub fn update_quiz(quiz: &Quiz, patch: QuizPatch) -> Quiz {
    let mut next = quiz.clone();
    if let Some(title) = patch.title {
        next.title = title;
    }
    if let Some(description) = patch.description {
        next.description = description;
    }
    if let Some(passing_grade) = patch.passing_grade {
        next.passing_grade = passing_grade;
    }
    if let Some(time_limit_secs) = patch.time_limit_secs {
        next.time_limit_secs = time_limit_secs;
    }
    if let Some(max_attempts) = patch.max_attempts {
        next.max_attempts = max_attempts;
    }
    if let Some(feedback_policy) = patch.feedback_policy {
        next.feedback_policy = feedback_policy;
    }
    if let Some(randomize) = patch.randomize_question_order {
        next.randomize_question_order = randomize;
    }
    next
}

/// Every validation failure that blocks publishing: quiz-level issues first,
/// then one entry per invalid question in canonical order.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    let settings = quiz.settings_issues();
    if !settings.is_empty() {
        failures.push(ValidationFailure::quiz(settings));
    }

    for question in &quiz.questions {
        let issues = question.validate();
        if !issues.is_empty() {
            failures.push(ValidationFailure::question(question.id, issues));
        }
    }

    failures
}

/// Run the publish gate. Only a quiz with at least one question and no
/// validation failures is publishable.
pub fn publish(quiz: &Quiz) -> Result<PublishedQuiz> {
    let failures = validate_quiz(quiz);
    if !failures.is_empty() {
        tracing::warn!(
            quiz = %quiz.id,
            "publish rejected: {} failure(s)",
            failures.len()
        );
        return Err(EngineError::ValidationFailure(failures));
    }
    tracing::debug!(quiz = %quiz.id, questions = quiz.questions.len(), "published");
    Ok(PublishedQuiz::new(quiz.clone()))
}

fn question_mut(quiz: &mut Quiz, question_id: QuestionId) -> Result<&mut Question> {
    quiz.questions
        .iter_mut()
        .find(|q| q.id == question_id)
        .ok_or(EngineError::UnknownQuestion(question_id))
}

/// Editor-style wrapper with undo/redo over the pure operations.
///
/// Each successful edit pushes the previous value onto the undo stack and
/// clears the redo stack. Failed edits leave the draft untouched.
#[derive(Debug, Clone)]
pub struct QuizDraft {
    current: Quiz,
    undo: Vec<Quiz>,
    redo: Vec<Quiz>,
    config: QuizforgeConfig,
}

impl QuizDraft {
    pub fn new(quiz: Quiz) -> Self {
        Self::with_config(quiz, QuizforgeConfig::default())
    }

    pub fn with_config(quiz: Quiz, config: QuizforgeConfig) -> Self {
        Self {
            current: quiz,
            undo: Vec::new(),
            redo: Vec::new(),
            config,
        }
    }

    pub fn current(&self) -> &Quiz {
        &self.current
    }

    pub fn into_inner(self) -> Quiz {
        self.current
    }

    /// Apply any pure edit to the current quiz.
    pub fn apply<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&Quiz) -> Result<Quiz>,
    {
        let next = edit(&self.current)?;
        let previous = std::mem::replace(&mut self.current, next);
        self.undo.push(previous);
        self.redo.clear();
        Ok(())
    }

    pub fn add_question(&mut self, question_type: QuestionType) -> QuestionId {
        let (next, id) = add_question_with(&self.current, question_type, &self.config);
        let previous = std::mem::replace(&mut self.current, next);
        self.undo.push(previous);
        self.redo.clear();
        id
    }

    pub fn update_question(&mut self, question_id: QuestionId, patch: QuestionPatch) -> Result<()> {
        self.apply(|quiz| update_question(quiz, question_id, patch))
    }

    pub fn set_correct_answers(
        &mut self,
        question_id: QuestionId,
        indices: impl IntoIterator<Item = usize>,
    ) -> Result<()> {
        self.apply(|quiz| set_correct_answers(quiz, question_id, indices))
    }

    pub fn remove_question(&mut self, question_id: QuestionId) -> Result<()> {
        self.apply(|quiz| remove_question(quiz, question_id))
    }

    pub fn reorder_questions(&mut self, new_order: &[QuestionId]) -> Result<()> {
        self.apply(|quiz| reorder_questions(quiz, new_order))
    }

    pub fn update_quiz(&mut self, patch: QuizPatch) -> Result<()> {
        self.apply(|quiz| Ok(update_quiz(quiz, patch)))
    }

    /// Step back one edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.current, previous);
                self.redo.push(current);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone edit. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.current, next);
                self.undo.push(current);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn validate(&self) -> Vec<ValidationFailure> {
        validate_quiz(&self.current)
    }

    pub fn publish(&self) -> Result<PublishedQuiz> {
        publish(&self.current)
    }
}
