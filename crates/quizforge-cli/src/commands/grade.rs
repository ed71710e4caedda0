//! The `quizforge grade` command.
//!
//! Replays an answers file through a fresh attempt: start, answer, let
//! `elapsed` seconds pass, submit. A timed quiz whose limit falls inside
//! `elapsed` is submitted by the clock, exactly as in a live attempt.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizforge_core::config::load_config_from;
use quizforge_core::{Attempt, GradingResult, SubmitOutcome, TickOutcome};

use super::publish_or_report;
use crate::quiz_file::{parse_answers_file, parse_quiz_file};
use crate::render::{print_result, GradeReport};

pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    elapsed: u32,
    format: String,
    require_pass: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quiz = parse_quiz_file(&quiz_path, &config)?;
    let published = publish_or_report(&quiz, &quiz_path)?;

    let answers = parse_answers_file(&answers_path, &published)?;

    let mut attempt = Attempt::new(published);
    attempt.start()?;
    for (question_id, selected) in answers {
        let number = attempt.quiz().position(question_id).map_or(0, |i| i + 1);
        attempt
            .answer(question_id, selected)
            .with_context(|| format!("answer to question {number}"))?;
    }

    let result = run_clock(&mut attempt, elapsed)?;

    match format.as_str() {
        "json" => {
            let report = GradeReport::new(attempt.quiz(), &result);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("Quiz: {}", attempt.quiz().title);
            print_result(attempt.quiz(), &result);
        }
    }

    if require_pass && !result.passed {
        std::process::exit(1);
    }

    Ok(())
}

fn run_clock(attempt: &mut Attempt, elapsed: u32) -> Result<GradingResult> {
    for _ in 0..elapsed {
        if let TickOutcome::Expired(result) = attempt.tick() {
            eprintln!("Time limit reached; submitted automatically.");
            return Ok(result);
        }
    }

    match attempt.submit()? {
        SubmitOutcome::Graded(result) => Ok(result),
        SubmitOutcome::AlreadySubmitted => attempt
            .result()
            .cloned()
            .context("attempt closed without a result"),
    }
}
