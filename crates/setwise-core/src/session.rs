//! One training session's timers.
//!
//! [`Session`] pairs the interval timer with the rest timer and starts the
//! rest automatically when a set reaches its target. It is plain data, so a
//! host can persist it between invocations.
//!
//! [`SessionDriver`] adds a [`Clock`] and observer callbacks. All mutating
//! calls go through `&mut self`, so one owner drives the session at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::TimerError;
use crate::events::Event;
use crate::model::Set;
use crate::timer::{IntervalTimer, RestTimer, TimerState};

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: TimerState,
    pub set_id: Option<String>,
    pub target_ms: u64,
    pub elapsed_ms: u64,
    pub remaining_ms: u64,
    pub effective_ms: u64,
    pub paused_ms: u64,
    /// 0.0 .. 1.0 progress towards the target.
    pub progress: f64,
    pub resting: bool,
    pub rest_remaining_ms: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    interval: IntervalTimer,
    rest: RestTimer,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(&self) -> &IntervalTimer {
        &self.interval
    }

    pub fn rest(&self) -> &RestTimer {
        &self.rest
    }

    /// Start timing `set`. The target defaults to the set's planned duration.
    ///
    /// A rest still running is skipped first.
    pub fn start_set(
        &mut self,
        set: Set,
        target_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, TimerError> {
        let target = target_ms.or(set.target_duration_ms).ok_or_else(|| {
            TimerError::InvalidConfiguration(format!("set {} has no target duration", set.id))
        })?;
        let started = self.interval.start(set, target, now)?;

        let mut events = Vec::with_capacity(2);
        events.extend(self.rest.skip(now));
        events.push(started);
        Ok(events)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>, TimerError> {
        Ok(vec![self.interval.pause(now)?])
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>, TimerError> {
        Ok(vec![self.interval.resume(now)?])
    }

    pub fn stop(
        &mut self,
        mark_completed: bool,
        now: DateTime<Utc>,
    ) -> Result<(Set, Vec<Event>), TimerError> {
        let (set, event) = self.interval.stop(mark_completed, now)?;
        Ok((set, vec![event]))
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> (Option<Set>, Vec<Event>) {
        let (set, event) = self.interval.reset(now);
        (set, vec![event])
    }

    /// Advance both timers. A natural finish with a rest duration starts the
    /// rest timer.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        events.extend(self.rest.tick(now));
        if let Some(finished) = self.interval.tick(now) {
            let rest_ms = match &finished {
                Event::SetFinished { rest_ms, .. } => *rest_ms,
                _ => None,
            };
            events.push(finished);
            if let Some(rest_ms) = rest_ms {
                events.extend(self.rest.start(rest_ms, now));
            }
        }
        events
    }

    pub fn skip_rest(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.rest.skip(now)
    }

    pub fn take_finished(&mut self) -> Option<Set> {
        self.interval.take_finished()
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        let interval = &self.interval;
        Snapshot {
            state: interval.state(),
            set_id: interval.bound_set().map(|s| s.id.clone()),
            target_ms: interval.target_ms(),
            elapsed_ms: interval.elapsed_ms(),
            remaining_ms: interval.remaining_ms(),
            effective_ms: interval.effective_duration_ms(now),
            paused_ms: interval.paused_ms(now),
            progress: interval.progress(),
            resting: self.rest.is_resting(),
            rest_remaining_ms: self.rest.remaining_ms(),
            at: now,
        }
    }
}

type Observer = Box<dyn FnMut(&Event)>;

/// Drives a [`Session`] from a [`Clock`] and forwards every event to the
/// registered observers.
pub struct SessionDriver<C: Clock> {
    session: Session,
    clock: C,
    observers: Vec<Observer>,
}

impl<C: Clock> SessionDriver<C> {
    pub fn new(clock: C) -> Self {
        Self::with_session(Session::new(), clock)
    }

    pub fn with_session(session: Session, clock: C) -> Self {
        Self {
            session,
            clock,
            observers: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Event) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn start_set(&mut self, set: Set, target_ms: Option<u64>) -> Result<Vec<Event>, TimerError> {
        let now = self.clock.now();
        let events = self.session.start_set(set, target_ms, now)?;
        Ok(self.dispatch(events))
    }

    pub fn pause(&mut self) -> Result<Vec<Event>, TimerError> {
        let now = self.clock.now();
        let events = self.session.pause(now)?;
        Ok(self.dispatch(events))
    }

    pub fn resume(&mut self) -> Result<Vec<Event>, TimerError> {
        let now = self.clock.now();
        let events = self.session.resume(now)?;
        Ok(self.dispatch(events))
    }

    pub fn stop(&mut self, mark_completed: bool) -> Result<(Set, Vec<Event>), TimerError> {
        let now = self.clock.now();
        let (set, events) = self.session.stop(mark_completed, now)?;
        Ok((set, self.dispatch(events)))
    }

    pub fn reset(&mut self) -> (Option<Set>, Vec<Event>) {
        let now = self.clock.now();
        let (set, events) = self.session.reset(now);
        (set, self.dispatch(events))
    }

    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let events = self.session.tick(now);
        self.dispatch(events)
    }

    pub fn skip_rest(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.session.skip_rest(now)?;
        self.dispatch(vec![event]).pop()
    }

    pub fn take_finished(&mut self) -> Option<Set> {
        self.session.take_finished()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot(self.clock.now())
    }

    fn dispatch(&mut self, events: Vec<Event>) -> Vec<Event> {
        for event in &events {
            for observer in &mut self.observers {
                observer(event);
            }
        }
        events
    }
}
