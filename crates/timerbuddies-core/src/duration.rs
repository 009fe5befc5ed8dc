//! Duration choices for the selection screen.

use crate::error::ValidationError;

/// A suggested duration with its button label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickPick {
    pub seconds: u64,
    pub label: &'static str,
}

pub const QUICK_PICKS: [QuickPick; 5] = [
    QuickPick { seconds: 10, label: "10s" },
    QuickPick { seconds: 60, label: "1 min" },
    QuickPick { seconds: 300, label: "5 min" },
    QuickPick { seconds: 600, label: "10 min" },
    QuickPick { seconds: 900, label: "15 min" },
];

pub const MAX_CUSTOM_MINUTES: u32 = 999;

/// Total seconds for a custom `minutes`/`seconds` entry.
///
/// Minutes must be 0-999, seconds 0-59, and the total above zero.
pub fn custom_duration(minutes: u32, seconds: u32) -> Result<u64, ValidationError> {
    if minutes > MAX_CUSTOM_MINUTES || seconds > 59 || (minutes == 0 && seconds == 0) {
        return Err(ValidationError::DurationOutOfRange { minutes, seconds });
    }
    Ok(u64::from(minutes) * 60 + u64::from(seconds))
}

/// `"2m 5s"`, `"2m"` or `"5s"`.
pub fn format_duration(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    match (mins, secs) {
        (0, s) => format!("{s}s"),
        (m, 0) => format!("{m}m"),
        (m, s) => format!("{m}m {s}s"),
    }
}
