//! Pause ledger.
//!
//! Records the suspension intervals of one timed set. Intervals are kept in
//! chronological order, never overlap, and at most the last one is open.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::span_ms;
use crate::error::TimerError;

/// One suspension. `end == None` means the pause is still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseInterval {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl PauseInterval {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length of the interval, measuring an open interval up to `now`.
    pub fn duration_ms(&self, now: DateTime<Utc>) -> u64 {
        span_ms(self.start, self.end.unwrap_or(now))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PauseLedger {
    intervals: Vec<PauseInterval>,
}

impl PauseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intervals(&self) -> &[PauseInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_paused(&self) -> bool {
        self.open_interval().is_some()
    }

    pub fn open_interval(&self) -> Option<&PauseInterval> {
        self.intervals.last().filter(|p| p.is_open())
    }

    /// Open a new interval at `now`.
    ///
    /// A start earlier than the previous interval's end is moved up to that
    /// end so intervals stay ordered.
    pub fn record_pause_start(&mut self, now: DateTime<Utc>) -> Result<(), TimerError> {
        if self.is_paused() {
            return Err(TimerError::AlreadyPaused);
        }
        let mut start = now;
        if let Some(prev_end) = self.intervals.last().and_then(|p| p.end) {
            if start < prev_end {
                tracing::warn!(
                    %now,
                    %prev_end,
                    "clock anomaly: pause start precedes previous pause end, clamping"
                );
                start = prev_end;
            }
        }
        self.intervals.push(PauseInterval { start, end: None });
        Ok(())
    }

    /// Seal the open interval at `now`. Returns its length, or `None` if
    /// nothing was open.
    pub fn record_pause_end(&mut self, now: DateTime<Utc>) -> Option<u64> {
        let open = self.intervals.last_mut().filter(|p| p.is_open())?;
        let end = if now < open.start {
            tracing::warn!(
                %now,
                start = %open.start,
                "clock anomaly: pause end precedes its start, clamping"
            );
            open.start
        } else {
            now
        };
        open.end = Some(end);
        Some(open.duration_ms(end))
    }

    /// Sum of sealed intervals plus the open one measured up to `now`.
    pub fn total_paused_ms(&self, now: DateTime<Utc>) -> u64 {
        self.intervals
            .iter()
            .map(|p| p.duration_ms(now))
            .fold(0u64, u64::saturating_add)
    }

    /// Drop the open interval, if any. Sealed intervals are untouched.
    pub fn discard_open(&mut self) -> Option<PauseInterval> {
        if self.is_paused() {
            self.intervals.pop()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// True when intervals are ordered, non-overlapping and only the last
    /// one may be open. Records decoded from storage are not re-validated,
    /// so callers that accept foreign data can check with this.
    pub fn is_well_formed(&self) -> bool {
        let last = self.intervals.len().saturating_sub(1);
        self.intervals.iter().enumerate().all(|(i, p)| {
            let sealed_ok = match p.end {
                Some(end) => end >= p.start,
                None => i == last,
            };
            let ordered = match i.checked_sub(1).map(|j| &self.intervals[j]) {
                Some(prev) => prev.end.is_some_and(|end| end <= p.start),
                None => true,
            };
            sealed_ok && ordered
        })
    }
}
