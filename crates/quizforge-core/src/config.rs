//! Engine configuration: authoring defaults and the attempt timer period.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::question::{CHOICE_OPTION_RANGE, DEFAULT_OPTION_COUNT};
use crate::quiz::FeedbackPolicy;

/// Top-level quizforge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Passing grade given to new quizzes.
    #[serde(default = "default_passing_grade")]
    pub passing_grade: u32,
    /// Retake limit given to new quizzes.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Feedback policy given to new quizzes.
    #[serde(default)]
    pub feedback_policy: FeedbackPolicy,
    /// Blank options added to new single-choice and multi-select questions.
    #[serde(default = "default_option_count")]
    pub default_option_count: usize,
    /// Real time per timer tick. One tick is one second of attempt time.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_passing_grade() -> u32 {
    70
}
fn default_max_attempts() -> u32 {
    3
}
fn default_option_count() -> usize {
    DEFAULT_OPTION_COUNT
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            passing_grade: default_passing_grade(),
            max_attempts: default_max_attempts(),
            feedback_policy: FeedbackPolicy::default(),
            default_option_count: default_option_count(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl QuizforgeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn check(&self) -> Result<()> {
        anyhow::ensure!(
            self.passing_grade <= 100,
            "passing_grade must be between 0 and 100, got {}",
            self.passing_grade
        );
        anyhow::ensure!(self.max_attempts >= 1, "max_attempts must be at least 1");
        anyhow::ensure!(
            CHOICE_OPTION_RANGE.contains(&self.default_option_count),
            "default_option_count must be between {} and {}, got {}",
            CHOICE_OPTION_RANGE.start(),
            CHOICE_OPTION_RANGE.end(),
            self.default_option_count
        );
        anyhow::ensure!(
            self.tick_interval_ms >= 1,
            "tick_interval_ms must be at least 1"
        );
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable override: `QUIZFORGE_TICK_MS`.
pub fn load_config() -> Result<QuizforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => QuizforgeConfig::default(),
    };

    if let Ok(raw) = std::env::var("QUIZFORGE_TICK_MS") {
        config.tick_interval_ms = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid QUIZFORGE_TICK_MS: '{raw}'"))?;
    }

    config.check()?;
    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config_str(content: &str) -> Result<QuizforgeConfig> {
    let config: QuizforgeConfig = toml::from_str(content)?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = QuizforgeConfig::default();
        assert_eq!(config.passing_grade, 70);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.default_option_count, 4);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert!(config.check().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config_str(
            r#"
passing_grade = 80
feedback_policy = "immediate"
"#,
        )
        .unwrap();
        assert_eq!(config.passing_grade, 80);
        assert_eq!(config.feedback_policy, FeedbackPolicy::Immediate);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizforge.toml");
        std::fs::write(&path, "max_attempts = 5\ndefault_option_count = 3\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.default_option_count, 3);
    }

    #[test]
    fn load_rejects_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "passing_grade = 150\n").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("passing_grade"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/no/such/quizforge.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_config_str("passing_grade = [").is_err());
    }
}
