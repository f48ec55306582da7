//! Whole-store JSON snapshots.
//!
//! The CLI keeps its state in a single JSON file: load it into a
//! [`MemoryStore`](crate::memory::MemoryStore) on startup, snapshot it back
//! out after anything changes. Every section defaults to empty so old or
//! hand-trimmed files keep loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizgate_core::attempt::QuizAttempt;
use quizgate_core::model::{Quiz, UserProfile};

/// Serialized contents of a store: the quiz catalog, the registered users,
/// and every recorded attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub quizzes: Vec<Quiz>,
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub attempts: Vec<QuizAttempt>,
}

impl StoreSnapshot {
    /// Save the snapshot as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory: {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize snapshot")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write snapshot: {}", path.display()))?;
        Ok(())
    }

    /// Load a snapshot from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse snapshot: {}", path.display()))?;
        Ok(snapshot)
    }
}
