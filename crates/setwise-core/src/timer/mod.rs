mod engine;
mod pause;
mod rest;

pub use engine::{IntervalTimer, TimerState};
pub use pause::{PauseInterval, PauseLedger};
pub use rest::RestTimer;

use chrono::{DateTime, Utc};

/// Milliseconds from `from` to `to`, negative when `to` is earlier.
pub(crate) fn span_ms_signed(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds()
}

/// Milliseconds from `from` to `to`, clamped at zero.
pub(crate) fn span_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    span_ms_signed(from, to).max(0) as u64
}
