//! # Timer Buddies Core Library
//!
//! State management for a children's countdown timer: the user picks a
//! duration and an optional reward image, the image is revealed as time
//! elapses, and the run ends with a celebration. Rendering, sound and image
//! fetching belong to the presentation layer; this crate owns the state.
//!
//! ## Architecture
//!
//! - **Timer**: a pure state machine ([`TimerMachine`]) driven by a cancellable
//!   one-second clock task ([`TimerEngine`]) that publishes snapshots
//! - **Registries**: timer presets and saved reward images, persisted through
//!   an injected [`PersistentStore`]
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: owner of the [`TimerSnapshot`]
//! - [`PresetRegistry`]: named `(duration, image)` presets
//! - [`SavedImageRegistry`]: bounded recency list of image references
//! - [`TimerBuddies`]: all of the above wired to one store

pub mod app;
pub mod duration;
pub mod error;
pub mod events;
pub mod images;
pub mod presets;
pub mod prompt;
pub mod storage;
pub mod timer;

pub use app::TimerBuddies;
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use images::SavedImageRegistry;
pub use presets::{PresetRegistry, TimerPreset};
pub use storage::{Config, MemoryStore, PersistentStore, SqliteStore};
pub use timer::{TimerEngine, TimerMachine, TimerPhase, TimerSnapshot};
