//! quizforge CLI: validate, grade, and take quizzes from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod quiz_file;
mod render;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "Quiz authoring and assessment engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check quiz files for authoring problems
    Validate {
        /// Path to a quiz .toml file or directory
        #[arg(long)]
        quiz: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade an answers file against a quiz
    Grade {
        /// Path to the quiz .toml file
        #[arg(long)]
        quiz: PathBuf,

        /// Path to the answers .toml file
        #[arg(long)]
        answers: PathBuf,

        /// Seconds spent on the attempt
        #[arg(long, default_value = "0")]
        elapsed: u32,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Exit code 1 if the attempt did not pass
        #[arg(long)]
        require_pass: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take a quiz interactively
    Take {
        /// Path to the quiz .toml file
        #[arg(long)]
        quiz: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "quizforge=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { quiz, config } => commands::validate::execute(quiz, config),
        Commands::Grade {
            quiz,
            answers,
            elapsed,
            format,
            require_pass,
            config,
        } => commands::grade::execute(quiz, answers, elapsed, format, require_pass, config),
        Commands::Take { quiz, config } => commands::take::execute(quiz, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
