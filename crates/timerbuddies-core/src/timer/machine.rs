//! Countdown state machine.
//!
//! The machine owns a [`TimerSnapshot`] and enforces transition legality. It
//! has no clock of its own: [`TimerEngine`](super::TimerEngine) drives
//! `tick()` once per elapsed second while the timer runs.
//!
//! ## State Transitions
//!
//! ```text
//! Unconfigured -configure-> Ready -start-> Running -pause-> Paused -start-> Running
//! Running -tick(remaining > 0)-> Running
//! Running -tick(remaining == 0)-> Complete
//! {Ready, Running, Paused, Complete} -reset-> Ready
//! any -back_to_selection-> Unconfigured
//! ```
//!
//! `start` and `pause` on `Complete` are no-ops.

use chrono::Utc;

use super::snapshot::{TimerPhase, TimerSnapshot};
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Default)]
pub struct TimerMachine {
    snapshot: TimerSnapshot,
}

impl TimerMachine {
    /// Start in the unconfigured sentinel state.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> &TimerSnapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> TimerPhase {
        self.snapshot.phase()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the snapshot with a fresh timer of `total_seconds`.
    pub fn configure(
        &mut self,
        total_seconds: u64,
        reward_image_ref: Option<String>,
    ) -> Result<Event, ValidationError> {
        if total_seconds == 0 {
            return Err(ValidationError::NonPositiveDuration {
                seconds: total_seconds,
            });
        }
        self.snapshot = TimerSnapshot::ready(total_seconds, reward_image_ref.clone());
        Ok(Event::TimerConfigured {
            total_seconds,
            reward_image_ref,
            at: Utc::now(),
        })
    }

    /// Returns `None` when already running or nothing is left to count down.
    pub fn start(&mut self) -> Option<Event> {
        let snap = &self.snapshot;
        if snap.remaining_seconds() == 0 || snap.is_running() {
            return None;
        }
        let resumed = snap.remaining_seconds() < snap.total_seconds();
        self.snapshot = snap.with_running(true);
        Some(Event::TimerStarted {
            remaining_seconds: self.snapshot.remaining_seconds(),
            resumed,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.snapshot.is_running() {
            return None;
        }
        self.snapshot = self.snapshot.with_running(false);
        Some(Event::TimerPaused {
            remaining_seconds: self.snapshot.remaining_seconds(),
            at: Utc::now(),
        })
    }

    /// Back to full duration, keeping the total and the reward image.
    pub fn reset(&mut self) -> Option<Event> {
        if !self.snapshot.is_configured() {
            return None;
        }
        let total = self.snapshot.total_seconds();
        self.snapshot =
            TimerSnapshot::ready(total, self.snapshot.reward_image_ref().map(str::to_owned));
        Some(Event::TimerReset {
            total_seconds: total,
            at: Utc::now(),
        })
    }

    pub fn back_to_selection(&mut self) -> Event {
        self.snapshot = TimerSnapshot::unconfigured();
        Event::ReturnedToSelection { at: Utc::now() }
    }

    /// Apply one elapsed second. Only a running timer advances.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.snapshot.is_running() {
            return None;
        }
        self.snapshot = self.snapshot.ticked();
        let snap = &self.snapshot;
        if snap.is_complete() {
            Some(Event::TimerCompleted {
                total_seconds: snap.total_seconds(),
                reward_image_ref: snap.reward_image_ref().map(str::to_owned),
                at: Utc::now(),
            })
        } else {
            Some(Event::TimerTicked {
                remaining_seconds: snap.remaining_seconds(),
                reveal_progress: snap.reveal_progress(),
                at: Utc::now(),
            })
        }
    }
}
