//! The `quizgate grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::Table;
use serde::Deserialize;

use quizgate_core::attempt::AnswerSubmission;
use quizgate_core::report::{format_time_spent, AttemptReport};

/// On-disk answer sheet, as a quiz-taking front end hands it over.
#[derive(Debug, Deserialize)]
struct AnswerSheet {
    /// When the user started. Defaults to the moment of grading.
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    answers: Vec<AnswerSubmission>,
}

pub async fn execute(
    quiz_id: String,
    user_id: String,
    answers_path: PathBuf,
    report_path: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store, gate) = super::open_gate(config_path.as_deref())?;

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answer sheet: {}", answers_path.display()))?;
    let sheet: AnswerSheet = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answer sheet: {}", answers_path.display()))?;

    let completed_at = Utc::now();
    let started_at = sheet.started_at.unwrap_or(completed_at);

    let attempt = gate
        .grade_and_record(&user_id, &quiz_id, &sheet.answers, started_at, completed_at)
        .await?;
    store.save(&config.store_path)?;

    let quiz = gate.quiz(&quiz_id).await?;
    let report = AttemptReport::new(&quiz, &attempt);

    match format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_summary(&report),
    }

    if let Some(path) = report_path {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &AttemptReport) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Your answer", "Correct answer", "Result"]);
    for row in &report.review {
        let selected = if row.selected.is_empty() {
            "(unanswered)".to_string()
        } else {
            row.selected.join(", ")
        };
        table.add_row(vec![
            row.question_text.clone(),
            selected,
            row.correct_answers.join(", "),
            if row.correct { "correct" } else { "wrong" }.to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!(
        "Attempt #{} scored {}% (pass mark {}%): {}",
        report.attempt_number,
        report.score,
        report.pass_score,
        if report.passed { "PASSED" } else { "FAILED" }
    );
    println!("Time: {}", format_time_spent(report.time_spent_secs));
}
