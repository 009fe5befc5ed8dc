pub mod config;
pub mod image;
pub mod preset;
pub mod prompt;
pub mod timer;

use std::sync::Arc;

use serde::Serialize;
use timerbuddies_core::{Config, SqliteStore, TimerBuddies};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the core against the on-disk store named in the config.
///
/// Must be called inside the Tokio runtime.
pub fn open_app() -> Result<TimerBuddies, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = SqliteStore::open_default(&config.storage.database)?;
    Ok(TimerBuddies::open(Arc::new(store), &config))
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One JSON document per line, for streamed output.
pub fn print_json_line<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
