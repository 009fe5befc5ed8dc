//! Durable key-value storage and configuration.
//!
//! The registries only need two operations from a store: read a string value
//! by key, and replace it atomically. [`SqliteStore`] is the on-disk
//! implementation; [`MemoryStore`] keeps everything in process.

mod config;
mod memory;
mod sqlite;

pub use config::{Config, ImagesConfig, StorageConfig, TimerConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Key holding the saved-image list.
pub const SAVED_IMAGES_KEY: &str = "saved_images";
/// Key holding the JSON array of timer presets.
pub const TIMER_PRESETS_KEY: &str = "timer_presets";

/// String-valued durable storage shared by the registries.
pub trait PersistentStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key` in a single write.
    fn put_atomic(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Returns the application data directory, creating it if needed.
///
/// `TIMERBUDDIES_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/timerbuddies[-dev]/`, with the `-dev` suffix when
/// `TIMERBUDDIES_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("TIMERBUDDIES_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TIMERBUDDIES_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("timerbuddies-dev")
            } else {
                base_dir.join("timerbuddies")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
