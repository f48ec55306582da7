//! The `quizgate validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizgate_core::parser;

pub fn execute(quizzes_path: PathBuf) -> Result<()> {
    let files = if quizzes_path.is_dir() {
        parser::quiz_files(&quizzes_path)?
    } else {
        vec![quizzes_path]
    };
    anyhow::ensure!(!files.is_empty(), "no quiz files found");

    let mut total_warnings = 0;
    let mut total_errors = 0;

    for path in &files {
        let quiz = match parser::parse_quiz_file(path) {
            Ok(quiz) => quiz,
            Err(e) => {
                println!("{}: ERROR: {e:#}", path.display());
                total_errors += 1;
                continue;
            }
        };

        println!("Quiz: {} ({} questions)", quiz.title, quiz.questions.len());

        if let Err(e) = parser::validate_quiz(&quiz) {
            println!("  ERROR: {e}");
            total_errors += 1;
        }

        let warnings = parser::lint_quiz(&quiz);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_errors > 0 {
        anyhow::bail!("{total_errors} quiz file(s) failed validation");
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
