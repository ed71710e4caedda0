//! Terminal output shared by the commands.

use comfy_table::{Cell, Table};
use serde::Serialize;

use quizforge_core::feedback::{review, ReviewItem};
use quizforge_core::{AnswerSet, AttemptView, GradingResult, Quiz, ValidationFailure};

/// One line per validation issue, prefixed with `[quiz]` or the 1-based
/// question number.
pub fn failure_lines(quiz: &Quiz, failures: &[ValidationFailure]) -> Vec<String> {
    let mut lines = Vec::new();
    for failure in failures {
        let prefix = match failure.question_id.and_then(|id| quiz.position(id)) {
            Some(index) => format!("[Q{}]", index + 1),
            None => "[quiz]".to_string(),
        };
        for issue in &failure.issues {
            lines.push(format!("  {prefix} {issue}"));
        }
    }
    lines
}

/// Machine-readable grading output.
#[derive(Debug, Serialize)]
pub struct GradeReport<'a> {
    pub title: &'a str,
    pub result: &'a GradingResult,
    pub review: Vec<ReviewItem>,
}

impl<'a> GradeReport<'a> {
    pub fn new(quiz: &'a Quiz, result: &'a GradingResult) -> Self {
        Self {
            title: &quiz.title,
            result,
            review: review(quiz, result),
        }
    }
}

pub fn print_result(quiz: &Quiz, result: &GradingResult) {
    let items = review(quiz, result);
    let reveal = items.iter().any(|item| item.feedback.is_some());

    let mut table = Table::new();
    let mut header = vec!["#", "Question", "Selected", "Result", "Points"];
    if reveal {
        header.push("Correct");
    }
    table.set_header(header);

    for item in &items {
        let mut row = vec![
            Cell::new(item.number),
            Cell::new(truncate(&item.prompt, 48)),
            Cell::new(format_set(&item.selected)),
            Cell::new(if item.is_correct { "correct" } else { "wrong" }),
            Cell::new(format!("{}/{}", item.points_awarded, item.points_possible)),
        ];
        if let Some(feedback) = &item.feedback {
            row.push(Cell::new(format_set(&feedback.correct_answers)));
        }
        table.add_row(row);
    }

    println!("{table}");

    if reveal {
        for item in &items {
            let explanation = item
                .feedback
                .as_ref()
                .and_then(|f| f.explanation.as_deref());
            if let (false, Some(text)) = (item.is_correct, explanation) {
                println!("Q{}: {text}", item.number);
            }
        }
    }

    println!(
        "Score: {}/{} points ({}%), passing grade {}%",
        result.points_earned, result.total_points, result.percentage, quiz.passing_grade
    );
    println!("Result: {}", if result.passed { "PASSED" } else { "FAILED" });
    println!("Time spent: {}", format_secs(result.time_spent_secs));
}

pub fn print_view(view: &AttemptView) {
    let Some(question) = &view.current else {
        return;
    };

    let clock = match view.remaining_secs {
        Some(remaining) => format!("{} left", format_secs(remaining)),
        None => format!("{} elapsed", format_secs(view.elapsed_secs)),
    };
    println!();
    println!(
        "Question {}/{} ({} answered, {clock})",
        view.position + 1,
        view.question_count,
        view.answered
    );
    println!("{} [{}, {} pt]", question.prompt, question.question_type, question.points);
    if question.min_selections == question.max_selections {
        println!("Select {}.", question.min_selections);
    } else {
        println!(
            "Select {} to {}.",
            question.min_selections, question.max_selections
        );
    }
    for (index, option) in question.options.iter().enumerate() {
        let mark = if question.selected.contains(&index) { "x" } else { " " };
        println!("  [{mark}] {index}: {option}");
    }
    if let Some(feedback) = &question.feedback {
        println!("Correct: {}", format_set(&feedback.correct_answers));
        if let Some(text) = &feedback.explanation {
            println!("{text}");
        }
    }
}

pub fn format_set(set: &AnswerSet) -> String {
    if set.is_empty() {
        return "-".to_string();
    }
    set.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn format_secs(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        assert_eq!(format_secs(0), "0:00");
        assert_eq!(format_secs(125), "2:05");
        assert_eq!(format_set(&AnswerSet::new()), "-");
        assert_eq!(format_set(&[2, 0].into_iter().collect()), "0,2");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer prompt", 8), "a lon...");
    }
}
