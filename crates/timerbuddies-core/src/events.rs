use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the core produces an Event.
/// The presentation layer subscribes to them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerConfigured {
        total_seconds: u64,
        reward_image_ref: Option<String>,
        at: DateTime<Utc>,
    },
    TimerStarted {
        remaining_seconds: u64,
        /// True when continuing a paused run rather than starting from full.
        resumed: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerTicked {
        remaining_seconds: u64,
        reveal_progress: f64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        total_seconds: u64,
        reward_image_ref: Option<String>,
        at: DateTime<Utc>,
    },
    TimerReset {
        total_seconds: u64,
        at: DateTime<Utc>,
    },
    ReturnedToSelection {
        at: DateTime<Utc>,
    },
    PresetSaved {
        id: String,
        name: String,
        seconds: u64,
        at: DateTime<Utc>,
    },
    PresetDeleted {
        id: String,
        at: DateTime<Utc>,
    },
    ImageSaved {
        image_ref: String,
        /// Oldest references dropped to stay within the cap.
        evicted: Vec<String>,
        at: DateTime<Utc>,
    },
    ImageRemoved {
        image_ref: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The snake_case name of the event, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerConfigured { .. } => "timer_configured",
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerTicked { .. } => "timer_ticked",
            Event::TimerCompleted { .. } => "timer_completed",
            Event::TimerReset { .. } => "timer_reset",
            Event::ReturnedToSelection { .. } => "returned_to_selection",
            Event::PresetSaved { .. } => "preset_saved",
            Event::PresetDeleted { .. } => "preset_deleted",
            Event::ImageSaved { .. } => "image_saved",
            Event::ImageRemoved { .. } => "image_removed",
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerConfigured { at, .. }
            | Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerTicked { at, .. }
            | Event::TimerCompleted { at, .. }
            | Event::TimerReset { at, .. }
            | Event::ReturnedToSelection { at }
            | Event::PresetSaved { at, .. }
            | Event::PresetDeleted { at, .. }
            | Event::ImageSaved { at, .. }
            | Event::ImageRemoved { at, .. } => *at,
        }
    }
}
