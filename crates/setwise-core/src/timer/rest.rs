//! Rest countdown between sets. No pause semantics; a new start replaces
//! whatever rest was running.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::span_ms_signed;
use crate::events::Event;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestTimer {
    in_rest: bool,
    duration_ms: u64,
    elapsed_ms: u64,
    #[serde(default)]
    last_tick: Option<DateTime<Utc>>,
    #[serde(default)]
    clock_anomalies: u32,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resting(&self) -> bool {
        self.in_rest
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Zero when not resting.
    pub fn remaining_ms(&self) -> u64 {
        if !self.in_rest {
            return 0;
        }
        self.duration_ms.saturating_sub(self.elapsed_ms)
    }

    pub fn clock_anomalies(&self) -> u32 {
        self.clock_anomalies
    }

    /// Start resting for `duration_ms`. A zero duration starts nothing.
    pub fn start(&mut self, duration_ms: u64, now: DateTime<Utc>) -> Option<Event> {
        if duration_ms == 0 {
            return None;
        }
        let replaced = self.in_rest;
        if replaced {
            tracing::debug!(
                remaining_ms = self.remaining_ms(),
                "rest restarted, previous rest cancelled"
            );
        }
        self.in_rest = true;
        self.duration_ms = duration_ms;
        self.elapsed_ms = 0;
        self.last_tick = Some(now);
        tracing::info!(duration_ms, "rest started");
        Some(Event::RestStarted {
            duration_ms,
            replaced,
            at: now,
        })
    }

    /// Accrue rest time; returns `Some(Event::RestFinished)` once when the
    /// duration is used up.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.in_rest {
            return None;
        }
        self.accrue(now);
        if self.elapsed_ms < self.duration_ms {
            return None;
        }
        self.elapsed_ms = self.duration_ms;
        self.finish();
        tracing::info!(duration_ms = self.duration_ms, "rest finished");
        Some(Event::RestFinished {
            duration_ms: self.duration_ms,
            at: now,
        })
    }

    /// Cancel the rest immediately, reporting what was left of it. Safe to
    /// call when not resting.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.in_rest {
            return None;
        }
        self.accrue(now);
        let remaining_ms = self.remaining_ms();
        self.finish();
        Some(Event::RestSkipped {
            remaining_ms,
            at: now,
        })
    }

    /// `last_tick` only moves forward.
    fn accrue(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_tick {
            let delta = span_ms_signed(last, now);
            if delta < 0 {
                self.clock_anomalies = self.clock_anomalies.saturating_add(1);
                tracing::warn!(delta_ms = delta, "clock anomaly in rest timer, clamping to zero");
                return;
            }
            self.elapsed_ms = self
                .elapsed_ms
                .saturating_add(delta as u64)
                .min(self.duration_ms);
        }
        self.last_tick = Some(now);
    }

    fn finish(&mut self) {
        self.in_rest = false;
        self.last_tick = None;
    }
}
