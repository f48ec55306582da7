//! quizgate CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizgate", version, about = "Movie trivia verification gate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate quiz TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quizzes: PathBuf,
    },

    /// List the quiz catalog
    List {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Register a user
    Register {
        /// User id
        #[arg(long)]
        user: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade an answer sheet and record the attempt
    Grade {
        /// Quiz id
        #[arg(long)]
        quiz: String,

        /// User id
        #[arg(long)]
        user: String,

        /// JSON answer sheet
        #[arg(long)]
        answers: PathBuf,

        /// Also write the attempt report JSON here
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check whether a user must pass verification for a quiz
    Check {
        /// Quiz id
        #[arg(long)]
        quiz: String,

        /// User id
        #[arg(long)]
        user: String,

        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a user's attempt history for a quiz
    History {
        /// Quiz id
        #[arg(long)]
        quiz: String,

        /// User id
        #[arg(long)]
        user: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show aggregate statistics for a quiz
    Stats {
        /// Quiz id
        #[arg(long)]
        quiz: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizgate=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { quizzes } => commands::validate::execute(quizzes),
        Commands::List { config } => commands::list::execute(config).await,
        Commands::Register {
            user,
            name,
            email,
            config,
        } => commands::register::execute(user, name, email, config),
        Commands::Grade {
            quiz,
            user,
            answers,
            report,
            format,
            config,
        } => commands::grade::execute(quiz, user, answers, report, format, config).await,
        Commands::Check {
            quiz,
            user,
            at,
            config,
        } => commands::check::execute(quiz, user, at, config).await,
        Commands::History { quiz, user, config } => {
            commands::history::execute(quiz, user, config).await
        }
        Commands::Stats { quiz, config } => commands::stats::execute(quiz, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
