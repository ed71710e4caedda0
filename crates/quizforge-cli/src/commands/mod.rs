pub mod grade;
pub mod init;
pub mod take;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use quizforge_core::authoring::publish;
use quizforge_core::{PublishedQuiz, Quiz};

use crate::render::failure_lines;

/// Publish `quiz`, printing every validation issue to stderr if it fails.
pub(crate) fn publish_or_report(quiz: &Quiz, source: &Path) -> Result<PublishedQuiz> {
    publish(quiz).map_err(|e| {
        if let Some(failures) = e.validation_failures() {
            for line in failure_lines(quiz, failures) {
                eprintln!("{line}");
            }
        }
        anyhow::Error::new(e).context(format!("{} is not ready to publish", source.display()))
    })
}
