use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimerError;
use crate::timer::{span_ms_signed, PauseLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl SetStatus {
    /// Completed, Failed and Skipped sets only accept note edits.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Statuses that carry an end time.
    pub fn has_end_time(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One set of an exercise.
///
/// Invariant: `end_time.is_some() == status.has_end_time()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub id: String,
    pub order: u32,

    #[serde(default)]
    pub target_reps: Option<u32>,
    #[serde(default)]
    pub target_weight: Option<f64>,
    #[serde(default)]
    pub target_duration_ms: Option<u64>,

    #[serde(default)]
    pub completed_reps: Option<u32>,
    #[serde(default)]
    pub completed_duration_ms: Option<u64>,
    /// Weight actually used.
    #[serde(default)]
    pub weight: Option<f64>,

    #[serde(default)]
    pub status: SetStatus,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rest_ms: Option<u64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub pauses: PauseLedger,
}

impl Set {
    pub fn new(order: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            order,
            target_reps: None,
            target_weight: None,
            target_duration_ms: None,
            completed_reps: None,
            completed_duration_ms: None,
            weight: None,
            status: SetStatus::Planned,
            start_time: None,
            end_time: None,
            rest_ms: None,
            notes: String::new(),
            pauses: PauseLedger::new(),
        }
    }

    /// A set held for a fixed duration.
    pub fn timed(order: u32, duration_ms: u64) -> Self {
        Self {
            target_duration_ms: Some(duration_ms),
            ..Self::new(order)
        }
    }

    /// A repetition set, optionally loaded.
    pub fn reps(order: u32, reps: u32, weight: Option<f64>) -> Self {
        Self {
            target_reps: Some(reps),
            target_weight: weight,
            ..Self::new(order)
        }
    }

    pub fn with_rest_ms(mut self, rest_ms: u64) -> Self {
        self.rest_ms = Some(rest_ms).filter(|ms| *ms > 0);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// Wall time since start, minus paused time, clamped at zero.
    ///
    /// A closed set measures up to its end time; an open one up to `now`.
    pub fn effective_duration_ms(&self, now: DateTime<Utc>) -> u64 {
        let raw = self.raw_effective_ms(now);
        if raw < 0 {
            tracing::warn!(
                set_id = %self.id,
                raw_ms = raw,
                "clock anomaly: effective duration negative, clamping to zero"
            );
        }
        raw.max(0) as u64
    }

    pub(crate) fn raw_effective_ms(&self, now: DateTime<Utc>) -> i64 {
        let Some(start) = self.start_time else {
            return 0;
        };
        let until = self.end_time.unwrap_or(now);
        let paused = i64::try_from(self.pauses.total_paused_ms(until)).unwrap_or(i64::MAX);
        span_ms_signed(start, until).saturating_sub(paused)
    }

    pub fn paused_ms(&self, now: DateTime<Utc>) -> u64 {
        self.pauses.total_paused_ms(self.end_time.unwrap_or(now))
    }

    /// Finish a repetition set directly, without the timer.
    pub fn complete_reps(
        &mut self,
        reps: u32,
        weight: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<(), TimerError> {
        self.ensure_open()?;
        self.completed_reps = Some(reps);
        self.weight = weight.or(self.target_weight);
        self.start_time.get_or_insert(now);
        self.close(SetStatus::Completed, Some(now));
        Ok(())
    }

    pub fn fail(&mut self, now: DateTime<Utc>) -> Result<(), TimerError> {
        self.ensure_open()?;
        self.start_time.get_or_insert(now);
        self.pauses.record_pause_end(now);
        self.close(SetStatus::Failed, Some(now));
        Ok(())
    }

    pub fn skip(&mut self) -> Result<(), TimerError> {
        self.ensure_open()?;
        self.pauses.discard_open();
        self.close(SetStatus::Skipped, None);
        Ok(())
    }

    /// Notes stay editable in every status.
    pub fn edit_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn append_note(&mut self, note: &str) {
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(note);
    }

    /// Back to Planned with targets kept, ready for the next session.
    pub fn reset_for_next_session(&mut self) {
        self.completed_reps = None;
        self.completed_duration_ms = None;
        self.weight = None;
        self.start_time = None;
        self.end_time = None;
        self.notes.clear();
        self.pauses.clear();
        self.status = SetStatus::Planned;
    }

    // ── Timer-owned lifecycle ────────────────────────────────────────

    pub(crate) fn begin(&mut self, now: DateTime<Utc>) {
        self.status = SetStatus::InProgress;
        self.start_time = Some(now);
        self.end_time = None;
        self.completed_duration_ms = None;
        self.pauses.clear();
    }

    pub(crate) fn finish_timed(&mut self, completed_ms: u64, now: DateTime<Utc>) {
        self.pauses.record_pause_end(now);
        self.completed_duration_ms = Some(completed_ms);
        self.close(SetStatus::Completed, Some(now));
    }

    /// Undo `begin`: the run never happened.
    pub(crate) fn abandon(&mut self) {
        self.pauses.clear();
        self.start_time = None;
        self.end_time = None;
        self.completed_duration_ms = None;
        self.status = SetStatus::Planned;
    }

    fn close(&mut self, status: SetStatus, end: Option<DateTime<Utc>>) {
        debug_assert_eq!(status.has_end_time(), end.is_some());
        self.status = status;
        self.end_time = end;
    }

    fn ensure_open(&self) -> Result<(), TimerError> {
        if self.is_closed() {
            return Err(TimerError::SetClosed {
                set_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn new_set_is_planned_without_times() {
        let set = Set::timed(0, 30_000);
        assert_eq!(set.status, SetStatus::Planned);
        assert!(set.start_time.is_none());
        assert!(set.end_time.is_none());
        assert_eq!(set.effective_duration_ms(t0()), 0);
    }

    #[test]
    fn zero_rest_is_treated_as_none() {
        assert_eq!(Set::timed(0, 1_000).with_rest_ms(0).rest_ms, None);
        assert_eq!(Set::timed(0, 1_000).with_rest_ms(500).rest_ms, Some(500));
    }

    #[test]
    fn complete_reps_sets_end_time_and_weight() {
        let mut set = Set::reps(0, 8, Some(60.0));
        set.complete_reps(8, None, t0()).unwrap();
        assert_eq!(set.status, SetStatus::Completed);
        assert_eq!(set.end_time, Some(t0()));
        assert_eq!(set.weight, Some(60.0));
        assert_eq!(set.completed_reps, Some(8));
    }

    #[test]
    fn skipped_set_has_no_end_time() {
        let mut set = Set::reps(0, 8, None);
        set.skip().unwrap();
        assert_eq!(set.status, SetStatus::Skipped);
        assert!(set.end_time.is_none());
    }

    #[test]
    fn closed_set_rejects_lifecycle_changes_but_accepts_notes() {
        let mut set = Set::reps(0, 5, None);
        set.fail(t0()).unwrap();
        assert!(matches!(set.skip(), Err(TimerError::SetClosed { .. })));
        assert!(set.complete_reps(5, None, t0()).is_err());
        set.edit_notes("grip slipped");
        assert_eq!(set.notes, "grip slipped");
        assert!(set.end_time.is_some());
    }

    #[test]
    fn effective_duration_excludes_pauses() {
        let mut set = Set::timed(0, 60_000);
        set.begin(t0());
        set.pauses
            .record_pause_start(t0() + Duration::seconds(10))
            .unwrap();
        set.pauses.record_pause_end(t0() + Duration::seconds(15));
        assert_eq!(set.effective_duration_ms(t0() + Duration::seconds(30)), 25_000);
    }

    #[test]
    fn effective_duration_clamps_clock_skew() {
        let mut set = Set::timed(0, 60_000);
        set.begin(t0());
        assert_eq!(set.effective_duration_ms(t0() - Duration::seconds(5)), 0);
    }

    #[test]
    fn append_note_separates_lines() {
        let mut set = Set::new(0);
        set.append_note("first");
        set.append_note("second");
        assert_eq!(set.notes, "first\nsecond");
    }

    #[test]
    fn reset_for_next_session_keeps_targets() {
        let mut set = Set::reps(2, 10, Some(40.0)).with_rest_ms(60_000);
        set.complete_reps(9, Some(40.0), t0()).unwrap();
        set.reset_for_next_session();
        assert_eq!(set.status, SetStatus::Planned);
        assert_eq!(set.target_reps, Some(10));
        assert_eq!(set.rest_ms, Some(60_000));
        assert!(set.completed_reps.is_none());
        assert!(set.end_time.is_none());
    }
}
