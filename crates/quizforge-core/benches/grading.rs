use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizforge_core::grading::{grade_answers, percentage};
use quizforge_core::question::{AnswerSet, Question, QuestionId, QuestionType};
use quizforge_core::quiz::Quiz;
use quizforge_core::statistics::QuizStatistics;

fn make_quiz(questions: usize) -> Quiz {
    let mut quiz = Quiz::new("bench");
    quiz.questions = (0..questions)
        .map(|i| {
            let mut question = Question::new(QuestionType::MultiSelect);
            question.prompt = format!("question {i}");
            question.options = (0..4).map(|o| format!("option {o}")).collect();
            question.correct_answers = [i % 4, (i + 1) % 4].into_iter().collect();
            question
        })
        .collect();
    quiz
}

fn make_answers(quiz: &Quiz) -> HashMap<QuestionId, AnswerSet> {
    quiz.questions
        .iter()
        .enumerate()
        .map(|(i, q)| (q.id, [i % 4].into_iter().collect()))
        .collect()
}

fn bench_grade(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade_answers");

    for size in [10, 100, 1000] {
        let quiz = make_quiz(size);
        let answers = make_answers(&quiz);
        group.bench_function(format!("questions={size}"), |b| {
            b.iter(|| grade_answers(black_box(&quiz), black_box(&answers), 60))
        });
    }

    group.finish();
}

fn bench_percentage(c: &mut Criterion) {
    c.bench_function("percentage", |b| {
        b.iter(|| percentage(black_box(37), black_box(41)))
    });
}

fn bench_statistics(c: &mut Criterion) {
    let quiz = make_quiz(50);
    let answers = make_answers(&quiz);
    let results: Vec<_> = (0..200)
        .map(|secs| grade_answers(&quiz, &answers, secs))
        .collect();

    c.bench_function("statistics/200_attempts", |b| {
        b.iter(|| QuizStatistics::compute(black_box(&quiz), black_box(&results)))
    });
}

criterion_group!(benches, bench_grade, bench_percentage, bench_statistics);
criterion_main!(benches);
