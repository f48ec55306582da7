//! The `quizgate stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use quizgate_core::report::format_time_spent;

pub async fn execute(quiz_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_config, _store, gate) = super::open_gate(config_path.as_deref())?;

    let quiz = gate.quiz(&quiz_id).await?;
    let stats = gate.statistics(&quiz_id).await?;

    println!("Quiz: {} ({})", quiz.title, quiz.movie_title);

    let mut table = Table::new();
    table.set_header(vec![
        "Completions",
        "Passed",
        "Pass rate",
        "Avg score",
        "Avg time",
    ]);
    table.add_row(vec![
        stats.completions.to_string(),
        stats.pass_count.to_string(),
        format!("{:.1}%", stats.pass_rate * 100.0),
        format!("{:.1}%", stats.average_score),
        format_time_spent(u32::try_from(stats.average_time_secs).unwrap_or(u32::MAX)),
    ]);
    println!("{table}");

    Ok(())
}
