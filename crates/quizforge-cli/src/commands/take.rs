//! The `quizforge take` command: an interactive, timed attempt on stdin.

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use quizforge_core::config::load_config_from;
use quizforge_core::{AnswerSet, LiveAttempt, TickOutcome};

use super::publish_or_report;
use crate::quiz_file::parse_quiz_file;
use crate::render::{format_secs, print_result, print_view};

const HELP: &str = "\
Commands:
  a <i,j,..>  answer the current question (option numbers; empty clears)
  n / p       next / previous question
  g <n>       go to question n
  s           submit
  q           abandon the attempt
  h           show this help";

enum Step {
    Continue,
    Finished,
}

pub async fn execute(quiz_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quiz = parse_quiz_file(&quiz_path, &config)?;
    let published = publish_or_report(&quiz, &quiz_path)?;

    println!("Quiz: {}", published.title);
    if !published.description.is_empty() {
        println!("{}", published.description);
    }
    match published.time_limit_secs {
        Some(limit) => println!("Time limit: {}", format_secs(limit)),
        None => println!("Untimed"),
    }
    println!("{HELP}");

    let mut live = LiveAttempt::new(published, config.tick_interval());
    live.start()?;
    print_view(&live.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    live.abandon()?;
                    println!("Input closed; attempt abandoned.");
                    return Ok(());
                };
                if let Step::Finished = handle(&mut live, line.trim()) {
                    break;
                }
            }
            Some(outcome) = live.next_tick() => {
                match outcome {
                    TickOutcome::Running { remaining_secs: Some(remaining @ (60 | 30 | 10)) } => {
                        println!("{remaining} seconds left.");
                    }
                    TickOutcome::Expired(_) => {
                        println!("Time is up; submitted automatically.");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    let attempt = live.into_attempt();
    match attempt.result() {
        Some(result) => print_result(attempt.quiz(), result),
        None => println!("Attempt abandoned."),
    }

    Ok(())
}

fn handle(live: &mut LiveAttempt, input: &str) -> Step {
    let (command, arg) = input
        .split_once(char::is_whitespace)
        .map_or((input, ""), |(c, a)| (c, a.trim()));

    match command {
        "" => print_view(&live.view()),
        "a" | "answer" => match parse_indices(arg) {
            Ok(selected) => match answer_current(live, selected.into_iter().collect()) {
                Ok(()) => print_view(&live.view()),
                Err(e) => println!("{e}"),
            },
            Err(e) => println!("{e}"),
        },
        "n" | "next" => {
            if !live.next() {
                println!("Already at the last question.");
            }
            print_view(&live.view());
        }
        "p" | "prev" => {
            if !live.previous() {
                println!("Already at the first question.");
            }
            print_view(&live.view());
        }
        "g" | "goto" => match arg.parse::<usize>() {
            Ok(number) if number >= 1 && live.go_to(number - 1) => print_view(&live.view()),
            _ => println!("No question '{arg}'."),
        },
        "s" | "submit" => match live.submit() {
            Ok(_) => return Step::Finished,
            Err(e) => println!("{e}"),
        },
        "q" | "quit" => match live.abandon() {
            Ok(()) => return Step::Finished,
            Err(e) => println!("{e}"),
        },
        "h" | "help" | "?" => println!("{HELP}"),
        other => println!("Unknown command '{other}'. Type h for help."),
    }
    Step::Continue
}

/// Record `selected` for the current question once it fits the question's
/// option bounds and selection limits.
fn answer_current(live: &mut LiveAttempt, selected: AnswerSet) -> quizforge_core::Result<()> {
    if let Some(question) = live.attempt().current_question() {
        question.check_selection(&selected)?;
        question.check_selection_count(&selected)?;
    }
    live.answer_current(selected)
}

/// Parse "0,2" or "0 2" into option indices.
fn parse_indices(arg: &str) -> Result<Vec<usize>, String> {
    arg.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| format!("'{part}' is not an option number"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_indices() {
        assert_eq!(parse_indices("0,2").unwrap(), vec![0, 2]);
        assert_eq!(parse_indices("1 3").unwrap(), vec![1, 3]);
        assert_eq!(parse_indices(" 2, 0 ").unwrap(), vec![2, 0]);
        assert!(parse_indices("").unwrap().is_empty());
        assert!(parse_indices("x").is_err());
    }
}
