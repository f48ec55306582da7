//! The `quizgate history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use quizgate_core::report::format_time_spent;

pub async fn execute(
    quiz_id: String,
    user_id: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_config, _store, gate) = super::open_gate(config_path.as_deref())?;

    let quiz = gate.quiz(&quiz_id).await?;
    let history = gate.history(&user_id, &quiz_id).await?;

    if history.is_empty() {
        println!("No attempts recorded for {user_id} on {}.", quiz.title);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Completed", "Score", "Result", "Time"]);
    for attempt in &history {
        table.add_row(vec![
            attempt.attempt_number.to_string(),
            attempt.completed_at.format("%Y-%m-%d %H:%M").to_string(),
            format!("{}%", attempt.score),
            if attempt.passed { "passed" } else { "failed" }.to_string(),
            format_time_spent(attempt.time_spent_secs),
        ]);
    }
    println!("{table}");

    Ok(())
}
