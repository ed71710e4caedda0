//! TOML quiz and answer files.
//!
//! The engine has no storage format of its own; this is the one the CLI
//! reads. Questions are numbered from 1 in file order, options from 0.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use quizforge_core::question::{true_false_options, QuestionKind};
use quizforge_core::{
    AnswerSet, Difficulty, FeedbackPolicy, Question, QuestionId, QuestionType, Quiz,
    QuizforgeConfig,
};

#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    passing_grade: Option<u32>,
    #[serde(default)]
    time_limit_secs: Option<u32>,
    #[serde(default)]
    max_attempts: Option<u32>,
    #[serde(default)]
    feedback_policy: Option<String>,
    #[serde(default)]
    randomize_question_order: bool,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(rename = "type")]
    question_type: String,
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct: Vec<usize>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    min_selections: Option<usize>,
    #[serde(default)]
    max_selections: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswersFile {
    #[serde(default)]
    answers: Vec<TomlAnswer>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswer {
    question: usize,
    #[serde(default)]
    selected: Vec<usize>,
}

/// Parse a single quiz file.
pub fn parse_quiz_file(path: &Path, config: &QuizforgeConfig) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path, config)
}

/// Parse a quiz from a TOML string. Settings the file omits come from `config`.
pub fn parse_quiz_str(content: &str, source_path: &Path, config: &QuizforgeConfig) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.quiz;
    let mut quiz = Quiz::with_defaults(header.title, config);
    quiz.description = header.description;
    quiz.time_limit_secs = header.time_limit_secs;
    quiz.randomize_question_order = header.randomize_question_order;
    if let Some(grade) = header.passing_grade {
        quiz.passing_grade = grade;
    }
    if let Some(max) = header.max_attempts {
        quiz.max_attempts = max;
    }
    if let Some(policy) = header.feedback_policy {
        quiz.feedback_policy = policy
            .parse::<FeedbackPolicy>()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    quiz.questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            convert_question(q).with_context(|| format!("question {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(quiz)
}

fn convert_question(q: TomlQuestion) -> Result<Question> {
    let question_type: QuestionType = q
        .question_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let options = if question_type == QuestionType::TrueFalse && q.options.is_empty() {
        true_false_options()
    } else {
        q.options
    };

    let mut question = Question::with_option_count(question_type, options.len());
    if let QuestionKind::MultiSelect {
        min_selections,
        max_selections,
    } = &mut question.kind
    {
        *min_selections = q.min_selections.unwrap_or(*min_selections);
        *max_selections = q.max_selections.unwrap_or(options.len());
    } else if q.min_selections.is_some() || q.max_selections.is_some() {
        anyhow::bail!("min_selections/max_selections only apply to multi-select questions");
    }

    question.prompt = q.prompt;
    question.options = options;
    question.correct_answers = q.correct.into_iter().collect();
    question.explanation = q.explanation;
    if let Some(difficulty) = q.difficulty {
        question.difficulty = difficulty
            .parse::<Difficulty>()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }
    if let Some(points) = q.points {
        question.points = points;
    }
    Ok(question)
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path, config: &QuizforgeConfig) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path, config)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz_file(&path, config) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// Load a file, or every quiz under a directory.
pub fn load_quizzes(path: &Path, config: &QuizforgeConfig) -> Result<Vec<Quiz>> {
    if path.is_dir() {
        load_quiz_directory(path, config)
    } else {
        Ok(vec![parse_quiz_file(path, config)?])
    }
}

/// Parse an answers file against `quiz`.
pub fn parse_answers_file(path: &Path, quiz: &Quiz) -> Result<Vec<(QuestionId, AnswerSet)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;

    parse_answers_str(&content, quiz)
        .with_context(|| format!("invalid answers file: {}", path.display()))
}

/// Resolve 1-based question numbers to ids. Each question may appear once.
pub fn parse_answers_str(content: &str, quiz: &Quiz) -> Result<Vec<(QuestionId, AnswerSet)>> {
    let parsed: TomlAnswersFile = toml::from_str(content)?;
    let mut seen = std::collections::HashSet::new();

    parsed
        .answers
        .into_iter()
        .map(|a| {
            let question = a
                .question
                .checked_sub(1)
                .and_then(|i| quiz.questions.get(i))
                .with_context(|| {
                    format!(
                        "question {} does not exist (quiz has {})",
                        a.question,
                        quiz.questions.len()
                    )
                })?;
            anyhow::ensure!(
                seen.insert(question.id),
                "question {} answered more than once",
                a.question
            );
            Ok((question.id, a.selected.into_iter().collect()))
        })
        .collect()
}
