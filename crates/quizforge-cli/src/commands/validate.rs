//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::authoring::validate_quiz;
use quizforge_core::config::load_config_from;

use crate::quiz_file::load_quizzes;
use crate::render::failure_lines;

pub fn execute(quiz_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quizzes = load_quizzes(&quiz_path, &config)?;
    if quizzes.is_empty() {
        anyhow::bail!("no quiz files found in {}", quiz_path.display());
    }

    let mut total_issues = 0;

    for quiz in &quizzes {
        println!(
            "Quiz: {} ({} questions, {} points)",
            quiz.title,
            quiz.questions.len(),
            quiz.total_points()
        );

        let lines = failure_lines(quiz, &validate_quiz(quiz));
        for line in &lines {
            println!("{line}");
        }
        total_issues += lines.len();
    }

    if total_issues > 0 {
        anyhow::bail!("{total_issues} issue(s) found");
    }
    println!("All quizzes valid.");

    Ok(())
}
