//! The `quizgate check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use quizgate_core::policy::{self, Eligibility};

pub async fn execute(
    quiz_id: String,
    user_id: String,
    at: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_config, _store, gate) = super::open_gate(config_path.as_deref())?;

    let now = match at {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .with_context(|| format!("--at expects an RFC 3339 timestamp, got {raw:?}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let quiz = gate.quiz(&quiz_id).await?;
    let decision = gate.gate_decision(&user_id, &quiz_id, now).await?;

    println!("Quiz: {} ({})", quiz.title, quiz.movie_title);

    if decision.bypass {
        if let Some(text) = decision.explanation() {
            println!("{text}");
        }
        return Ok(());
    }

    println!("To leave a verified review for this movie, you need to pass a short knowledge quiz.");

    match gate.eligibility(&user_id, &quiz_id, now).await? {
        Eligibility::Eligible => {
            let history = gate.history(&user_id, &quiz_id).await?;
            println!(
                "You can start attempt #{} now.",
                policy::next_attempt_number(&history)
            );
        }
        Eligibility::InCooldown { until } => {
            println!("Retake available after {}.", until.format("%Y-%m-%d %H:%M UTC"));
        }
    }
    println!("The verification window closes on {}.", decision.window_ends);

    Ok(())
}
