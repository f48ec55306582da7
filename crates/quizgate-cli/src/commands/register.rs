//! The `quizgate register` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use quizgate_core::model::UserProfile;
use quizgate_store::{load_config_from, MemoryStore};

pub fn execute(
    user_id: String,
    name: String,
    email: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = MemoryStore::load(&config.store_path)?;

    let existing = store
        .snapshot()
        .users
        .into_iter()
        .find(|u| u.id == user_id);
    let joined_date = existing
        .as_ref()
        .map(|u| u.joined_date)
        .unwrap_or_else(|| Utc::now().date_naive());

    store.insert_user(UserProfile {
        id: user_id.clone(),
        name,
        email,
        joined_date,
    });
    store.save(&config.store_path)?;

    if existing.is_some() {
        println!("Updated user {user_id}.");
    } else {
        println!("Registered user {user_id}.");
    }
    Ok(())
}
