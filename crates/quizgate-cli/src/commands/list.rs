//! The `quizgate list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let (_config, _store, gate) = super::open_gate(config_path.as_deref())?;
    let catalog = gate.catalog().await?;

    if catalog.is_empty() {
        println!("No quizzes in the catalog. Run `quizgate init` to create an example.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Movie", "Released", "Status", "Questions"]);
    for quiz in &catalog {
        let questions = if quiz.session_size() == quiz.questions.len() {
            quiz.questions.len().to_string()
        } else {
            format!("{} of {}", quiz.session_size(), quiz.questions.len())
        };
        table.add_row(vec![
            quiz.id.clone(),
            quiz.title.clone(),
            quiz.movie_title.clone(),
            quiz.movie_release_date.to_string(),
            quiz.status.to_string(),
            questions,
        ]);
    }
    println!("{table}");

    Ok(())
}
