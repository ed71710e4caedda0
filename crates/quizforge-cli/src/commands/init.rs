//! The `quizforge init` command.

use std::path::Path;

use anyhow::Result;

use quizforge_core::authoring::validate_quiz;
use quizforge_core::config::load_config_from;

use crate::quiz_file::parse_quiz_file;
use crate::render::failure_lines;

const CONFIG_PATH: &str = "quizforge.toml";
const EXAMPLE_PATH: &str = "quizzes/example.toml";

pub fn execute() -> Result<()> {
    write_if_absent(Path::new(CONFIG_PATH), SAMPLE_CONFIG)?;
    std::fs::create_dir_all("quizzes")?;
    write_if_absent(Path::new(EXAMPLE_PATH), EXAMPLE_QUIZ)?;

    let config = load_config_from(None)?;
    let quiz = parse_quiz_file(Path::new(EXAMPLE_PATH), &config)?;
    let failures = validate_quiz(&quiz);
    if failures.is_empty() {
        println!(
            "{EXAMPLE_PATH}: {} questions, {} points, ready to publish",
            quiz.questions.len(),
            quiz.total_points()
        );
    } else {
        println!("{EXAMPLE_PATH} has authoring problems:");
        for line in failure_lines(&quiz, &failures) {
            println!("  {line}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Edit {EXAMPLE_PATH}");
    println!("  2. Run: quizforge validate --quiz {EXAMPLE_PATH}");
    println!("  3. Run: quizforge take --quiz {EXAMPLE_PATH}");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration
# Defaults for quizzes that do not set these themselves.

passing_grade = 70
max_attempts = 3
feedback_policy = "after-completion"
default_option_count = 4

# Real time per second of attempt time, in milliseconds.
tick_interval_ms = 1000
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
title = "Example Quiz"
description = "A short quiz to get started"
passing_grade = 70
time_limit_secs = 300
feedback_policy = "immediate"

[[questions]]
type = "single-choice"
prompt = "Which planet is closest to the sun?"
options = ["Venus", "Mercury", "Mars"]
correct = [1]
explanation = "Mercury orbits closest to the sun."

[[questions]]
type = "multi-select"
prompt = "Which of these are prime numbers?"
options = ["2", "4", "7", "9"]
correct = [0, 2]
points = 2

[[questions]]
type = "true-false"
prompt = "Water boils at 100 degrees Celsius at sea level."
correct = [0]
difficulty = "easy"
"#;
