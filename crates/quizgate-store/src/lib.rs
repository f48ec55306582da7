//! quizgate-store — Storage backends and configuration.
//!
//! Implements the core store traits over an in-memory map with JSON
//! snapshot persistence, and loads the gate's configuration file.

pub mod config;
pub mod memory;
pub mod snapshot;

pub use config::{load_config, load_config_from, QuizgateConfig};
pub use memory::MemoryStore;
pub use snapshot::StoreSnapshot;
