//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use quizgate_core::parser;
use quizgate_core::service::VerificationGate;
use quizgate_store::{load_config_from, MemoryStore, QuizgateConfig};

pub mod check;
pub mod grade;
pub mod history;
pub mod init;
pub mod list;
pub mod register;
pub mod stats;
pub mod validate;

/// Load config, open the store, seed the catalog, and wire up the gate.
///
/// The quiz directory is the catalog's source of truth: every TOML file in
/// it replaces its snapshot counterpart on startup, so edits to quiz files
/// land without touching the store.
pub(crate) fn open_gate(
    config_path: Option<&Path>,
) -> Result<(QuizgateConfig, Arc<MemoryStore>, VerificationGate)> {
    let config = load_config_from(config_path)?;
    let store = Arc::new(MemoryStore::load(&config.store_path)?);

    if config.quiz_dir.is_dir() {
        let quizzes = parser::load_quiz_directory(&config.quiz_dir)?;
        tracing::debug!("loaded {} quizzes from {}", quizzes.len(), config.quiz_dir.display());
        for quiz in quizzes {
            store.insert_quiz(quiz);
        }
    }

    let gate = VerificationGate::new(
        store.clone(),
        store.clone(),
        store.clone(),
        config.policy.clone(),
    );
    Ok((config, store, gate))
}
