//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAFETY: &str = "../../quizzes/workplace-safety.toml";
const DATA_PROTECTION: &str = "../../quizzes/data-protection.toml";

fn quizforge() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizforge").unwrap()
}

#[test]
fn validate_valid_quiz() {
    quizforge()
        .arg("validate")
        .arg("--quiz")
        .arg(SAFETY)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions, 4 points"))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_directory() {
    quizforge()
        .arg("validate")
        .arg("--quiz")
        .arg("../../quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workplace Safety"))
        .stdout(predicate::str::contains("Data Protection Basics"));
}

#[test]
fn validate_reports_every_issue() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[quiz]
title = "Broken"
passing_grade = 120

[[questions]]
type = "single-choice"
prompt = ""
options = ["only one"]
correct = [3]
"#,
    )
    .unwrap();

    quizforge()
        .arg("validate")
        .arg("--quiz")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[quiz] passing_grade"))
        .stdout(predicate::str::contains("[Q1] prompt: prompt is empty"))
        .stdout(predicate::str::contains("[Q1] options"))
        .stdout(predicate::str::contains("[Q1] correct_answers"))
        .stderr(predicate::str::contains("issue(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    quizforge()
        .arg("validate")
        .arg("--quiz")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_passing_answers() {
    quizforge()
        .arg("grade")
        .arg("--quiz")
        .arg(SAFETY)
        .arg("--answers")
        .arg("../../answers/workplace-safety-pass.toml")
        .arg("--elapsed")
        .arg("95")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 4/4 points (100%)"))
        .stdout(predicate::str::contains("Result: PASSED"))
        .stdout(predicate::str::contains("Time spent: 1:35"));
}

#[test]
fn grade_partial_multi_select_earns_nothing() {
    quizforge()
        .arg("grade")
        .arg("--quiz")
        .arg(SAFETY)
        .arg("--answers")
        .arg("../../answers/workplace-safety-fail.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 1/4 points (25%)"))
        .stdout(predicate::str::contains("Result: FAILED"))
        .stdout(predicate::str::contains("Q2: Near misses, injuries and spills"));
}

#[test]
fn grade_require_pass_fails_on_failed_attempt() {
    quizforge()
        .arg("grade")
        .arg("--quiz")
        .arg(SAFETY)
        .arg("--answers")
        .arg("../../answers/workplace-safety-fail.toml")
        .arg("--require-pass")
        .assert()
        .code(1);
}

#[test]
fn grade_json_output() {
    let output = quizforge()
        .arg("grade")
        .arg("--quiz")
        .arg(SAFETY)
        .arg("--answers")
        .arg("../../answers/workplace-safety-pass.toml")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["title"], "Workplace Safety");
    assert_eq!(report["result"]["percentage"], 100);
    assert_eq!(report["result"]["passed"], true);
    assert_eq!(report["review"].as_array().unwrap().len(), 3);
}

#[test]
fn grade_time_limit_submits_automatically() {
    quizforge()
        .arg("grade")
        .arg("--quiz")
        .arg(DATA_PROTECTION)
        .arg("--answers")
        .arg("../../answers/data-protection.toml")
        .arg("--elapsed")
        .arg("90")
        .assert()
        .success()
        .stderr(predicate::str::contains("Time limit reached"))
        .stdout(predicate::str::contains("Score: 3/4 points (75%)"))
        .stdout(predicate::str::contains("Time spent: 1:00"));
}

#[test]
fn grade_out_of_range_answer() {
    let dir = TempDir::new().unwrap();
    let answers = dir.path().join("answers.toml");
    std::fs::write(&answers, "[[answers]]\nquestion = 1\nselected = [5]\n").unwrap();

    quizforge()
        .arg("grade")
        .arg("--quiz")
        .arg(SAFETY)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("answer to question 1"))
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn take_and_submit() {
    quizforge()
        .arg("take")
        .arg("--quiz")
        .arg(SAFETY)
        .write_stdin("a 0\nn\na 0,2,3\nn\na 1\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1/3"))
        .stdout(predicate::str::contains("Question 3/3"))
        .stdout(predicate::str::contains("Score: 4/4 points (100%)"))
        .stdout(predicate::str::contains("Result: PASSED"));
}

#[test]
fn take_navigation_and_bad_input() {
    quizforge()
        .arg("take")
        .arg("--quiz")
        .arg(SAFETY)
        .write_stdin("p\na 9\ng 3\na 0\nwat\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already at the first question"))
        .stdout(predicate::str::contains("out of range"))
        .stdout(predicate::str::contains("Unknown command 'wat'"))
        .stdout(predicate::str::contains("Score: 0/4 points (0%)"));
}

#[test]
fn take_rejects_too_many_selections() {
    quizforge()
        .arg("take")
        .arg("--quiz")
        .arg(SAFETY)
        .write_stdin("a 0,1\na 0\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("takes 1 to 1 selection(s), got 2"))
        .stdout(predicate::str::contains("Score: 1/4 points (25%)"));
}

#[test]
fn take_quit_abandons() {
    quizforge()
        .arg("take")
        .arg("--quiz")
        .arg(SAFETY)
        .write_stdin("a 0\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempt abandoned."))
        .stdout(predicate::str::contains("Result:").not());
}

#[test]
fn take_closed_input_abandons() {
    quizforge()
        .arg("take")
        .arg("--quiz")
        .arg(SAFETY)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Input closed; attempt abandoned."));
}

#[test]
fn take_rejects_invalid_quiz() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.toml");
    std::fs::write(&path, "[quiz]\ntitle = \"Empty\"\n").unwrap();

    quizforge()
        .arg("take")
        .arg("--quiz")
        .arg(&path)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("[quiz] questions"))
        .stderr(predicate::str::contains("not ready to publish"));
}

#[test]
fn config_file_sets_defaults() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("quizforge.toml");
    std::fs::write(&config, "passing_grade = 20\n").unwrap();
    let quiz = dir.path().join("quiz.toml");
    std::fs::write(
        &quiz,
        r#"
[quiz]
title = "Lenient"

[[questions]]
type = "true-false"
prompt = "The sky is blue."
correct = [0]

[[questions]]
type = "true-false"
prompt = "Grass is red."
correct = [1]

[[questions]]
type = "true-false"
prompt = "Snow is cold."
correct = [0]

[[questions]]
type = "true-false"
prompt = "Fire is cold."
correct = [1]
"#,
    )
    .unwrap();
    let answers = dir.path().join("answers.toml");
    std::fs::write(&answers, "[[answers]]\nquestion = 1\nselected = [0]\n").unwrap();

    quizforge()
        .arg("grade")
        .arg("--quiz")
        .arg(&quiz)
        .arg("--answers")
        .arg(&answers)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("(25%), passing grade 20%"))
        .stdout(predicate::str::contains("Result: PASSED"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizforge.toml"))
        .stdout(predicate::str::contains("Created quizzes/example.toml"))
        .stdout(predicate::str::contains(
            "quizzes/example.toml: 3 questions, 4 points, ready to publish",
        ));

    assert!(dir.path().join("quizforge.toml").exists());
    assert!(dir.path().join("quizzes/example.toml").exists());

    quizforge()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--quiz")
        .arg("quizzes/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    quizforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiz authoring and assessment engine"));
}

#[test]
fn version_output() {
    quizforge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizforge"));
}
