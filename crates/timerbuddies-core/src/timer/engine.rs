//! Async timer engine.
//!
//! Wraps a [`TimerMachine`] with a cancellable one-second clock task and
//! publishes every new snapshot on a `watch` channel and every event on a
//! `broadcast` channel.
//!
//! ## Clock ownership
//!
//! At most one clock task exists per engine. Each task is tagged with the
//! epoch that was current when it was spawned; `pause`, `reset`,
//! `back_to_selection`, `configure` and `shutdown` bump the epoch and abort the
//! task while holding the state lock, and a tick only applies if its epoch is
//! still current. Once a cancelling call returns, no tick from the cancelled
//! run can land.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = TimerEngine::new();
//! let mut snapshots = engine.subscribe();
//! engine.configure(600, None)?;
//! engine.start();
//! while snapshots.changed().await.is_ok() {
//!     render(&snapshots.borrow());
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::machine::TimerMachine;
use super::snapshot::TimerSnapshot;
use crate::error::ValidationError;
use crate::events::Event;
use crate::storage::Config;

/// Default clock period.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const EVENT_CHANNEL_CAPACITY: usize = 256;

struct ClockState {
    machine: TimerMachine,
    /// Incremented on every cancel; ticks from older epochs are discarded.
    epoch: u64,
    clock: Option<JoinHandle<()>>,
}

struct Shared {
    state: Mutex<ClockState>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    events_tx: broadcast::Sender<Event>,
}

#[derive(Debug, PartialEq, Eq)]
enum TickOutcome {
    Applied,
    Completed,
    /// The epoch moved on or the timer is no longer running.
    Stale,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish while the state lock is held so subscribers see changes in order.
    fn publish(&self, state: &ClockState, event: &Event) {
        self.snapshot_tx.send_replace(state.machine.snapshot().clone());
        // No receivers is fine.
        let _ = self.events_tx.send(event.clone());
    }

    fn cancel_clock(state: &mut ClockState) {
        state.epoch += 1;
        if let Some(handle) = state.clock.take() {
            handle.abort();
            debug!(epoch = state.epoch, "clock cancelled");
        }
    }

    fn apply_tick(&self, epoch: u64) -> TickOutcome {
        let mut state = self.lock();
        if state.epoch != epoch {
            debug!(epoch, current = state.epoch, "discarding stale tick");
            return TickOutcome::Stale;
        }
        let Some(event) = state.machine.tick() else {
            return TickOutcome::Stale;
        };
        self.publish(&state, &event);
        match event {
            Event::TimerCompleted { total_seconds, .. } => {
                info!(total_seconds, "timer complete");
                // The clock is finishing on its own; drop the handle.
                state.clock = None;
                TickOutcome::Completed
            }
            _ => {
                debug!(remaining = state.machine.snapshot().remaining_seconds(), "tick");
                TickOutcome::Applied
            }
        }
    }
}

async fn run_clock(shared: Weak<Shared>, epoch: u64, period: Duration) {
    loop {
        tokio::time::sleep(period).await;
        let Some(strong) = shared.upgrade() else {
            return;
        };
        if strong.apply_tick(epoch) != TickOutcome::Applied {
            return;
        }
    }
}

/// Authoritative owner of the timer snapshot.
///
/// Must be created inside a Tokio runtime; the clock task is spawned on it.
/// Dropping the engine cancels the clock.
pub struct TimerEngine {
    shared: Arc<Shared>,
    runtime: Handle,
    tick_interval: Duration,
}

impl TimerEngine {
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new() -> Self {
        Self::with_tick_interval(TICK_INTERVAL)
    }

    pub fn with_config(config: &Config) -> Self {
        Self::with_tick_interval(config.tick_interval())
    }

    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. See
    /// [`TimerEngine::try_with_tick_interval`].
    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        Self::build(Handle::current(), tick_interval)
    }

    /// Like [`TimerEngine::with_tick_interval`], but fails instead of
    /// panicking when no runtime is entered.
    pub fn try_with_tick_interval(tick_interval: Duration) -> Result<Self, TryCurrentError> {
        Ok(Self::build(Handle::try_current()?, tick_interval))
    }

    fn build(runtime: Handle, tick_interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::unconfigured());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ClockState {
                    machine: TimerMachine::new(),
                    epoch: 0,
                    clock: None,
                }),
                snapshot_tx,
                events_tx,
            }),
            runtime,
            tick_interval,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> TimerSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Latest-value subscription; receivers always observe whole snapshots.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Every event, in emission order.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.events_tx.subscribe()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn has_active_clock(&self) -> bool {
        self.shared
            .lock()
            .clock
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn configure(
        &self,
        total_seconds: u64,
        reward_image_ref: Option<String>,
    ) -> Result<Event, ValidationError> {
        let mut state = self.shared.lock();
        let event = state.machine.configure(total_seconds, reward_image_ref)?;
        Shared::cancel_clock(&mut state);
        info!(total_seconds, "timer configured");
        self.shared.publish(&state, &event);
        Ok(event)
    }

    pub fn configure_minutes(
        &self,
        minutes: u64,
        reward_image_ref: Option<String>,
    ) -> Result<Event, ValidationError> {
        self.configure(minutes.saturating_mul(60), reward_image_ref)
    }

    /// Start or resume the countdown. Calling it while running is a no-op.
    pub fn start(&self) -> Option<Event> {
        let mut state = self.shared.lock();
        let event = state.machine.start()?;
        Shared::cancel_clock(&mut state);
        let epoch = state.epoch;
        state.clock = Some(self.runtime.spawn(run_clock(
            Arc::downgrade(&self.shared),
            epoch,
            self.tick_interval,
        )));
        info!(
            epoch,
            remaining = state.machine.snapshot().remaining_seconds(),
            "timer started"
        );
        self.shared.publish(&state, &event);
        Some(event)
    }

    pub fn pause(&self) -> Option<Event> {
        let mut state = self.shared.lock();
        Shared::cancel_clock(&mut state);
        let event = state.machine.pause()?;
        info!(
            remaining = state.machine.snapshot().remaining_seconds(),
            "timer paused"
        );
        self.shared.publish(&state, &event);
        Some(event)
    }

    pub fn reset(&self) -> Option<Event> {
        let mut state = self.shared.lock();
        Shared::cancel_clock(&mut state);
        let event = state.machine.reset()?;
        info!("timer reset");
        self.shared.publish(&state, &event);
        Some(event)
    }

    pub fn back_to_selection(&self) -> Event {
        let mut state = self.shared.lock();
        Shared::cancel_clock(&mut state);
        let event = state.machine.back_to_selection();
        info!("returned to selection");
        self.shared.publish(&state, &event);
        event
    }

    /// Cancel the clock without touching the snapshot.
    pub fn shutdown(&self) {
        let mut state = self.shared.lock();
        Shared::cancel_clock(&mut state);
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerPhase;
    use tokio::time::sleep;

    #[test]
    fn construction_outside_runtime_is_an_error() {
        assert!(TimerEngine::try_with_tick_interval(TICK_INTERVAL).is_err());
    }

    #[test]
    #[should_panic]
    fn new_outside_runtime_panics() {
        let _ = TimerEngine::new();
    }

    fn count_ticks(rx: &mut broadcast::Receiver<Event>) -> usize {
        let mut ticks = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, Event::TimerTicked { .. } | Event::TimerCompleted { .. }) {
                ticks += 1;
            }
        }
        ticks
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_to_completion() {
        let engine = TimerEngine::new();
        engine.configure(10, None).unwrap();
        engine.start();

        sleep(Duration::from_millis(10_500)).await;

        let snap = engine.snapshot();
        assert_eq!(snap.remaining_seconds(), 0);
        assert!(snap.is_complete());
        assert!(!snap.is_running());
        assert_eq!(snap.reveal_progress(), 1.0);
        assert!(!engine.has_active_clock());
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_spawns_one_clock() {
        let engine = TimerEngine::new();
        let mut events = engine.events();
        engine.configure(6, None).unwrap();
        assert!(engine.start().is_some());
        assert!(engine.start().is_none());

        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(engine.snapshot().remaining_seconds(), 3);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(count_ticks(&mut events), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_and_resume_continues() {
        let engine = TimerEngine::new();
        engine.configure(300, None).unwrap();
        engine.start();
        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(engine.snapshot().remaining_seconds(), 297);

        engine.pause();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(engine.snapshot().remaining_seconds(), 297);
        assert_eq!(engine.snapshot().phase(), TimerPhase::Paused);

        engine.start();
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(engine.snapshot().remaining_seconds(), 296);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_while_running_discards_pending_tick() {
        let engine = TimerEngine::new();
        engine.configure(10, Some("star.png".into())).unwrap();
        engine.start();
        sleep(Duration::from_millis(6_500)).await;
        assert_eq!(engine.snapshot().remaining_seconds(), 4);

        engine.reset();
        let snap = engine.snapshot();
        assert_eq!(snap.remaining_seconds(), 10);
        assert!(!snap.is_running());
        assert_eq!(snap.reward_image_ref(), Some("star.png"));

        sleep(Duration::from_secs(3)).await;
        assert_eq!(engine.snapshot().remaining_seconds(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_epoch_tick_is_ignored() {
        let engine = TimerEngine::new();
        engine.configure(10, None).unwrap();
        engine.start();
        let stale_epoch = engine.shared.lock().epoch;

        engine.pause();
        engine.start();

        assert_eq!(engine.shared.apply_tick(stale_epoch), TickOutcome::Stale);
        assert_eq!(engine.snapshot().remaining_seconds(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_selection_stops_clock() {
        let engine = TimerEngine::new();
        engine.configure(5, None).unwrap();
        engine.start();
        sleep(Duration::from_millis(1_500)).await;

        engine.back_to_selection();
        sleep(Duration::from_secs(3)).await;
        assert_eq!(engine.snapshot(), TimerSnapshot::unconfigured());
        assert!(!engine.has_active_clock());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_receive_snapshots() {
        let engine = TimerEngine::new();
        let mut rx = engine.subscribe();
        engine.configure(3, None).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().total_seconds(), 3);

        engine.start();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_running());

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().remaining_seconds(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_configure_leaves_running_timer_alone() {
        let engine = TimerEngine::new();
        engine.configure(5, None).unwrap();
        engine.start();
        assert!(engine.configure(0, None).is_err());
        assert!(engine.snapshot().is_running());
        assert!(engine.has_active_clock());
    }

    #[tokio::test(start_paused = true)]
    async fn configure_minutes_converts_to_seconds() {
        let engine = TimerEngine::new();
        engine.configure_minutes(5, None).unwrap();
        assert_eq!(engine.snapshot().total_seconds(), 300);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_clock() {
        let engine = TimerEngine::new();
        let rx = engine.subscribe();
        engine.configure(5, None).unwrap();
        engine.start();
        drop(engine);
        sleep(Duration::from_secs(3)).await;
        assert_eq!(rx.borrow().remaining_seconds(), 5);
    }
}
