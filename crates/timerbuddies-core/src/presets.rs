//! Named timer presets.
//!
//! Presets are kept most-recently-saved first and persisted as a JSON array of
//! `{id, name, seconds, imageUrl}` records under [`TIMER_PRESETS_KEY`]. Every
//! change is written to the store before it becomes visible to subscribers;
//! a failed write leaves the list untouched.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::storage::{PersistentStore, TIMER_PRESETS_KEY};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A named, reusable `(duration, image)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPreset {
    pub id: String,
    pub name: String,
    pub seconds: u64,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl TimerPreset {
    fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.trim().is_empty() && self.seconds > 0
    }
}

pub struct PresetRegistry {
    store: Arc<dyn PersistentStore>,
    /// Serializes writers; holds the last id handed out.
    last_id: Mutex<i64>,
    presets: watch::Sender<Vec<TimerPreset>>,
    events: broadcast::Sender<Event>,
}

impl PresetRegistry {
    /// Load presets from `store`. Missing or malformed data yields an empty list.
    pub fn load(store: Arc<dyn PersistentStore>) -> Self {
        let presets = load_presets(store.as_ref());
        let last_id = presets
            .iter()
            .filter_map(|p| p.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        let (presets, _) = watch::channel(presets);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            last_id: Mutex::new(last_id),
            presets,
            events,
        }
    }

    /// Most-recently-saved first.
    pub fn list(&self) -> Vec<TimerPreset> {
        self.presets.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<TimerPreset> {
        self.presets.borrow().iter().find(|p| p.id == id).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<TimerPreset>> {
        self.presets.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Save a new preset at the front of the list.
    ///
    /// # Errors
    /// Rejects an empty name or a zero duration, and returns store errors
    /// from the write.
    pub fn save(&self, name: &str, seconds: u64, image_url: Option<String>) -> Result<TimerPreset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if seconds == 0 {
            return Err(ValidationError::NonPositiveDuration { seconds }.into());
        }

        let mut last_id = self.lock_writer();
        let id = next_id(*last_id, Utc::now().timestamp_millis());
        let preset = TimerPreset {
            id: id.to_string(),
            name: name.to_string(),
            seconds,
            image_url,
        };

        let mut presets = self.list();
        presets.insert(0, preset.clone());
        self.persist(&presets)?;
        *last_id = id;
        self.presets.send_replace(presets);

        info!(id = %preset.id, name = %preset.name, seconds, "preset saved");
        let _ = self.events.send(Event::PresetSaved {
            id: preset.id.clone(),
            name: preset.name.clone(),
            seconds,
            at: Utc::now(),
        });
        Ok(preset)
    }

    /// Remove the preset with `id`. Returns `false` if there was none.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let _writer = self.lock_writer();
        let mut presets = self.list();
        let before = presets.len();
        presets.retain(|p| p.id != id);
        if presets.len() == before {
            return Ok(false);
        }

        self.persist(&presets)?;
        self.presets.send_replace(presets);

        info!(id, "preset deleted");
        let _ = self.events.send(Event::PresetDeleted {
            id: id.to_string(),
            at: Utc::now(),
        });
        Ok(true)
    }

    fn lock_writer(&self) -> MutexGuard<'_, i64> {
        self.last_id.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, presets: &[TimerPreset]) -> Result<()> {
        let json = serde_json::to_string(presets)?;
        self.store.put_atomic(TIMER_PRESETS_KEY, &json)?;
        Ok(())
    }
}

/// Millisecond timestamp, bumped past the last id so ids never repeat.
fn next_id(last_id: i64, now_ms: i64) -> i64 {
    now_ms.max(last_id.saturating_add(1))
}

fn load_presets(store: &dyn PersistentStore) -> Vec<TimerPreset> {
    let raw = match store.get(TIMER_PRESETS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read presets; starting empty");
            return Vec::new();
        }
    };

    let presets: Vec<TimerPreset> = match serde_json::from_str(&raw) {
        Ok(presets) => presets,
        Err(e) => {
            warn!(error = %e, "malformed presets; starting empty");
            return Vec::new();
        }
    };

    let total = presets.len();
    let valid: Vec<TimerPreset> = presets.into_iter().filter(TimerPreset::is_valid).collect();
    if valid.len() != total {
        warn!(dropped = total - valid.len(), "dropped invalid preset records");
    }
    valid
}
