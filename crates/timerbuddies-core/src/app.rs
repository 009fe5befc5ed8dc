//! The application core as one value.
//!
//! [`TimerBuddies`] wires the timer engine and both registries to a single
//! injected store and exposes the intents the presentation layer sends.

use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::images::SavedImageRegistry;
use crate::presets::{PresetRegistry, TimerPreset};
use crate::storage::{Config, PersistentStore};
use crate::timer::TimerEngine;

pub struct TimerBuddies {
    engine: TimerEngine,
    presets: PresetRegistry,
    images: SavedImageRegistry,
}

impl TimerBuddies {
    /// Load registries from `store` and create an idle engine.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn open(store: Arc<dyn PersistentStore>, config: &Config) -> Self {
        Self {
            engine: TimerEngine::with_config(config),
            presets: PresetRegistry::load(Arc::clone(&store)),
            images: SavedImageRegistry::with_capacity(store, config.images.max_saved),
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    pub fn images(&self) -> &SavedImageRegistry {
        &self.images
    }

    /// Configure the timer from a saved preset, using the preset's image.
    pub fn select_preset(&self, id: &str) -> Result<(TimerPreset, Event)> {
        let preset = self
            .presets
            .get(id)
            .ok_or_else(|| ValidationError::UnknownPreset { id: id.to_string() })?;
        let event = self
            .engine
            .configure(preset.seconds, preset.image_url.clone())?;
        Ok((preset, event))
    }

    /// Save the current timer selection as a preset.
    pub fn save_current_as_preset(&self, name: &str) -> Result<TimerPreset> {
        let snapshot = self.engine.snapshot();
        self.presets.save(
            name,
            snapshot.total_seconds(),
            snapshot.reward_image_ref().map(str::to_owned),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn select_preset_configures_engine() {
        let app = TimerBuddies::open(Arc::new(MemoryStore::new()), &Config::default());
        let preset = app
            .presets()
            .save("Homework", 600, Some("owl.png".into()))
            .unwrap();

        let (selected, _) = app.select_preset(&preset.id).unwrap();
        assert_eq!(selected, preset);

        let snap = app.engine().snapshot();
        assert_eq!(snap.total_seconds(), 600);
        assert_eq!(snap.reward_image_ref(), Some("owl.png"));
    }

    #[tokio::test(start_paused = true)]
    async fn select_unknown_preset_fails() {
        let app = TimerBuddies::open(Arc::new(MemoryStore::new()), &Config::default());
        assert!(matches!(
            app.select_preset("missing"),
            Err(CoreError::Validation(ValidationError::UnknownPreset { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn save_current_requires_configured_timer() {
        let app = TimerBuddies::open(Arc::new(MemoryStore::new()), &Config::default());
        assert!(app.save_current_as_preset("Nothing").is_err());

        app.engine().configure(90, None).unwrap();
        let preset = app.save_current_as_preset("Teeth").unwrap();
        assert_eq!(preset.seconds, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn image_cap_comes_from_config() {
        let mut config = Config::default();
        config.images.max_saved = 3;
        let app = TimerBuddies::open(Arc::new(MemoryStore::new()), &config);
        assert_eq!(app.images().capacity(), 3);
    }
}
