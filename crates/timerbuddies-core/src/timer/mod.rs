mod engine;
mod machine;
mod snapshot;

pub use engine::{TimerEngine, TICK_INTERVAL};
pub use machine::TimerMachine;
pub use snapshot::{reveal_progress, TimerPhase, TimerSnapshot};
