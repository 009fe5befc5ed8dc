//! Immutable timer snapshot.
//!
//! A snapshot is replaced wholesale on every change. The derived fields
//! (`is_complete`, `reveal_progress`) are computed in the constructor from
//! `total_seconds` and `remaining_seconds`, and the fields are private, so a
//! snapshot can never carry a reveal fraction that disagrees with its clock.

use serde::{Deserialize, Serialize};

/// Coarse state of the timer, derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// No timer configured; the selection screen is shown.
    Unconfigured,
    /// Configured and sitting at full duration.
    Ready,
    Running,
    /// Stopped part-way through a run.
    Paused,
    Complete,
}

/// Complete observable timer state at an instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    total_seconds: u64,
    remaining_seconds: u64,
    is_running: bool,
    is_complete: bool,
    reveal_progress: f64,
    reward_image_ref: Option<String>,
}

impl TimerSnapshot {
    /// The "no timer configured" sentinel.
    pub fn unconfigured() -> Self {
        Self::new(0, 0, false, None)
    }

    /// A freshly configured timer sitting at full duration.
    pub fn ready(total_seconds: u64, reward_image_ref: Option<String>) -> Self {
        Self::new(total_seconds, total_seconds, false, reward_image_ref)
    }

    /// Build a snapshot, clamping `remaining_seconds` to `total_seconds`.
    ///
    /// A completed snapshot is never running, whatever `is_running` says.
    pub fn new(
        total_seconds: u64,
        remaining_seconds: u64,
        is_running: bool,
        reward_image_ref: Option<String>,
    ) -> Self {
        let remaining_seconds = remaining_seconds.min(total_seconds);
        let is_complete = total_seconds > 0 && remaining_seconds == 0;
        Self {
            total_seconds,
            remaining_seconds,
            is_running: is_running && !is_complete && total_seconds > 0,
            is_complete,
            reveal_progress: reveal_progress(total_seconds, remaining_seconds),
            reward_image_ref,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// 0.0 .. 1.0 fraction of the configured duration that has elapsed.
    pub fn reveal_progress(&self) -> f64 {
        self.reveal_progress
    }

    pub fn reward_image_ref(&self) -> Option<&str> {
        self.reward_image_ref.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.total_seconds > 0
    }

    pub fn phase(&self) -> TimerPhase {
        if !self.is_configured() {
            TimerPhase::Unconfigured
        } else if self.is_complete {
            TimerPhase::Complete
        } else if self.is_running {
            TimerPhase::Running
        } else if self.remaining_seconds == self.total_seconds {
            TimerPhase::Ready
        } else {
            TimerPhase::Paused
        }
    }

    /// Button label for the start intent: "Start" at full duration, "Resume" otherwise.
    pub fn start_label(&self) -> &'static str {
        if self.remaining_seconds == self.total_seconds {
            "Start"
        } else {
            "Resume"
        }
    }

    /// Same timer, one second further along.
    pub(crate) fn ticked(&self) -> Self {
        Self::new(
            self.total_seconds,
            self.remaining_seconds.saturating_sub(1),
            self.is_running,
            self.reward_image_ref.clone(),
        )
    }

    pub(crate) fn with_running(&self, is_running: bool) -> Self {
        Self::new(
            self.total_seconds,
            self.remaining_seconds,
            is_running,
            self.reward_image_ref.clone(),
        )
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::unconfigured()
    }
}

/// `1 - remaining/total`, or 0 when no timer is configured.
pub fn reveal_progress(total_seconds: u64, remaining_seconds: u64) -> f64 {
    if total_seconds == 0 {
        return 0.0;
    }
    let remaining = remaining_seconds.min(total_seconds);
    1.0 - (remaining as f64 / total_seconds as f64)
}
