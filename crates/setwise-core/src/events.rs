use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every timer state change produces an Event.
/// Hosts subscribe through [`SessionDriver`](crate::session::SessionDriver)
/// or collect them from the [`Session`](crate::session::Session) return
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SetStarted {
        set_id: String,
        target_ms: u64,
        at: DateTime<Utc>,
    },
    SetPaused {
        set_id: String,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    SetResumed {
        set_id: String,
        elapsed_ms: u64,
        /// Length of the pause that just ended.
        paused_ms: u64,
        at: DateTime<Utc>,
    },
    /// Target reached.
    SetFinished {
        set_id: String,
        completed_ms: u64,
        rest_ms: Option<u64>,
        at: DateTime<Utc>,
    },
    /// Stopped by the user before the target.
    SetStopped {
        set_id: String,
        completed_ms: u64,
        early: bool,
        at: DateTime<Utc>,
    },
    TimerReset {
        set_id: Option<String>,
        at: DateTime<Utc>,
    },
    RestStarted {
        duration_ms: u64,
        /// A rest that was still running got cancelled.
        replaced: bool,
        at: DateTime<Utc>,
    },
    RestFinished {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    RestSkipped {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SetStarted { at, .. }
            | Event::SetPaused { at, .. }
            | Event::SetResumed { at, .. }
            | Event::SetFinished { at, .. }
            | Event::SetStopped { at, .. }
            | Event::TimerReset { at, .. }
            | Event::RestStarted { at, .. }
            | Event::RestFinished { at, .. }
            | Event::RestSkipped { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_snake_case_tag() {
        let event = Event::RestSkipped {
            remaining_ms: 1_500,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "rest_skipped");
        assert_eq!(json["remaining_ms"], 1_500);
    }
}
