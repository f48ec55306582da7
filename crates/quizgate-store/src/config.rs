//! Gate configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizgate_core::policy::PolicyConfig;

/// Top-level quizgate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizgateConfig {
    /// Directory of quiz TOML files to seed the catalog from.
    #[serde(default = "default_quiz_dir")]
    pub quiz_dir: PathBuf,
    /// Where the store snapshot lives.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Retake and bypass policy constants.
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_quiz_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./quizgate-store.json")
}

impl Default for QuizgateConfig {
    fn default() -> Self {
        Self {
            quiz_dir: default_quiz_dir(),
            store_path: default_store_path(),
            policy: PolicyConfig::default(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizgate.toml` in the current directory
/// 2. `~/.config/quizgate/config.toml`
///
/// Environment variable overrides: `QUIZGATE_STORE`, `QUIZGATE_QUIZ_DIR`.
pub fn load_config() -> Result<QuizgateConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizgateConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizgate.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizgateConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizgateConfig::default(),
    };

    // Apply env var overrides
    if let Ok(store) = std::env::var("QUIZGATE_STORE") {
        config.store_path = PathBuf::from(store);
    }
    if let Ok(dir) = std::env::var("QUIZGATE_QUIZ_DIR") {
        config.quiz_dir = PathBuf::from(dir);
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizgate"))
}
