//! Interval timer for one timed set.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads and never reads the clock: every command takes `now`, and the
//! caller is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Finished
//! Running | Paused -> Idle      (stop, reset)
//! Finished -> Idle              (take_finished, reset)
//! ```
//!
//! Elapsed time accrues from deltas between successive `now` values while
//! Running, so late or skipped ticks neither lose nor add time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::span_ms_signed;
use crate::error::TimerError;
use crate::events::Event;
use crate::model::Set;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
    /// Target reached. The completed set is held until taken.
    Finished,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervalTimer {
    state: TimerState,
    /// The set being timed. Present in Running, Paused and Finished.
    set: Option<Set>,
    target_ms: u64,
    /// Running time accrued so far, capped at `target_ms`.
    elapsed_ms: u64,
    /// `now` of the last accrual while Running.
    #[serde(default)]
    last_tick: Option<DateTime<Utc>>,
    #[serde(default)]
    clock_anomalies: u32,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Running or Paused.
    pub fn is_active(&self) -> bool {
        matches!(self.state, TimerState::Running | TimerState::Paused)
    }

    pub fn target_ms(&self) -> u64 {
        self.target_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.target_ms.saturating_sub(self.elapsed_ms)
    }

    /// 0.0 .. 1.0 progress towards the target.
    pub fn progress(&self) -> f64 {
        if self.target_ms == 0 {
            return 0.0;
        }
        (self.elapsed_ms as f64 / self.target_ms as f64).min(1.0)
    }

    pub fn bound_set(&self) -> Option<&Set> {
        self.set.as_ref()
    }

    /// Number of times a clock moving backwards was clamped.
    pub fn clock_anomalies(&self) -> u32 {
        self.clock_anomalies
    }

    /// Wall time since the set started, minus paused time. Zero when no set
    /// is bound.
    pub fn effective_duration_ms(&self, now: DateTime<Utc>) -> u64 {
        self.set
            .as_ref()
            .map(|s| s.effective_duration_ms(now))
            .unwrap_or(0)
    }

    pub fn paused_ms(&self, now: DateTime<Utc>) -> u64 {
        self.set.as_ref().map(|s| s.paused_ms(now)).unwrap_or(0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Bind `set` and start timing it towards `target_ms`.
    pub fn start(&mut self, mut set: Set, target_ms: u64, now: DateTime<Utc>) -> Result<Event, TimerError> {
        if let Some(bound) = &self.set {
            return Err(TimerError::AlreadyActive {
                set_id: bound.id.clone(),
            });
        }
        if target_ms == 0 {
            return Err(TimerError::InvalidConfiguration(
                "target duration must be positive".into(),
            ));
        }
        if set.is_closed() {
            return Err(TimerError::SetClosed {
                set_id: set.id.clone(),
                status: set.status,
            });
        }

        set.begin(now);
        let event = Event::SetStarted {
            set_id: set.id.clone(),
            target_ms,
            at: now,
        };
        self.set = Some(set);
        self.target_ms = target_ms;
        self.elapsed_ms = 0;
        self.last_tick = Some(now);
        self.transition(TimerState::Running);
        Ok(event)
    }

    /// Accrue elapsed time. Returns `Some(Event::SetFinished)` exactly once,
    /// on the tick that reaches the target.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.elapsed_ms < self.target_ms {
            return None;
        }

        let target = self.target_ms;
        let set = self.set.as_mut()?;
        set.finish_timed(target, now);
        let set_id = set.id.clone();
        self.last_tick = None;
        self.transition(TimerState::Finished);
        tracing::info!(%set_id, completed_ms = target, "set finished");
        Some(Event::SetFinished {
            set_id,
            completed_ms: target,
            rest_ms: self.set.as_ref().and_then(|s| s.rest_ms),
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Event, TimerError> {
        self.require(TimerState::Running, "pause")?;
        let set = self.set.as_mut().ok_or(TimerError::InvalidTransition {
            op: "pause",
            state: self.state,
        })?;
        set.pauses.record_pause_start(now)?;
        let set_id = set.id.clone();

        self.flush_elapsed(now);
        self.last_tick = None;
        self.transition(TimerState::Paused);
        Ok(Event::SetPaused {
            set_id,
            elapsed_ms: self.elapsed_ms,
            at: now,
        })
    }

    /// Resume accrual from the same elapsed value. Time spent paused is not
    /// caught up.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Event, TimerError> {
        self.require(TimerState::Paused, "resume")?;
        let set = self.set.as_mut().ok_or(TimerError::InvalidTransition {
            op: "resume",
            state: self.state,
        })?;
        let paused_ms = set.pauses.record_pause_end(now).unwrap_or(0);
        let set_id = set.id.clone();

        self.last_tick = Some(now);
        self.transition(TimerState::Running);
        Ok(Event::SetResumed {
            set_id,
            elapsed_ms: self.elapsed_ms,
            paused_ms,
            at: now,
        })
    }

    /// Finalize the set as Completed before the target is reached and
    /// return it.
    ///
    /// With `mark_completed` the completed duration is the accrued elapsed
    /// time. Without it, the completed duration is the effective duration and
    /// a note records the early stop.
    pub fn stop(&mut self, mark_completed: bool, now: DateTime<Utc>) -> Result<(Set, Event), TimerError> {
        if !self.is_active() {
            return Err(self.rejected("stop"));
        }
        if self.state == TimerState::Running {
            self.flush_elapsed(now);
        }
        let mut set = self.set.take().ok_or(TimerError::InvalidTransition {
            op: "stop",
            state: self.state,
        })?;
        set.pauses.record_pause_end(now);

        let completed_ms = if mark_completed {
            self.elapsed_ms
        } else {
            let raw = set.raw_effective_ms(now);
            if raw < 0 {
                self.note_anomaly(raw);
            }
            let effective = raw.max(0) as u64;
            set.append_note(&format!("Stopped early at {} seconds", effective / 1000));
            effective
        };
        set.finish_timed(completed_ms, now);

        let event = Event::SetStopped {
            set_id: set.id.clone(),
            completed_ms,
            early: !mark_completed,
            at: now,
        };
        tracing::info!(set_id = %set.id, completed_ms, early = !mark_completed, "set stopped");
        self.clear();
        Ok((set, event))
    }

    /// Cancel from any state and unbind the set.
    ///
    /// An unfinished set comes back as Planned with its pause history from
    /// this run dropped. A set already finished comes back untouched.
    pub fn reset(&mut self, now: DateTime<Utc>) -> (Option<Set>, Event) {
        let mut set = self.set.take();
        if let Some(s) = set.as_mut().filter(|s| !s.is_closed()) {
            s.abandon();
        }
        let event = Event::TimerReset {
            set_id: set.as_ref().map(|s| s.id.clone()),
            at: now,
        };
        self.clear();
        (set, event)
    }

    /// Hand back the completed set after a natural finish.
    pub fn take_finished(&mut self) -> Option<Set> {
        if self.state != TimerState::Finished {
            return None;
        }
        let set = self.set.take();
        self.clear();
        set
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Accrue the time since `last_tick`. A `now` behind `last_tick` adds
    /// nothing and leaves `last_tick` where it was, so the stretch already
    /// counted is not counted again once the clock catches up.
    fn flush_elapsed(&mut self, now: DateTime<Utc>) {
        let Some(last) = self.last_tick else {
            return;
        };
        let delta = span_ms_signed(last, now);
        if delta < 0 {
            self.note_anomaly(delta);
            return;
        }
        self.elapsed_ms = self
            .elapsed_ms
            .saturating_add(delta as u64)
            .min(self.target_ms);
        self.last_tick = Some(now);
    }

    fn note_anomaly(&mut self, delta_ms: i64) {
        self.clock_anomalies = self.clock_anomalies.saturating_add(1);
        tracing::warn!(delta_ms, "clock anomaly: time moved backwards, clamping to zero");
    }

    fn transition(&mut self, to: TimerState) {
        tracing::debug!(from = ?self.state, ?to, "interval timer transition");
        self.state = to;
    }

    fn require(&self, state: TimerState, op: &'static str) -> Result<(), TimerError> {
        if self.state == state {
            Ok(())
        } else {
            Err(self.rejected(op))
        }
    }

    fn rejected(&self, op: &'static str) -> TimerError {
        tracing::warn!(op, state = ?self.state, "rejected timer operation");
        TimerError::InvalidTransition {
            op,
            state: self.state,
        }
    }

    fn clear(&mut self) {
        self.set = None;
        self.target_ms = 0;
        self.elapsed_ms = 0;
        self.last_tick = None;
        self.transition(TimerState::Idle);
    }
}
