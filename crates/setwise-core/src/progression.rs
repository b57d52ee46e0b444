//! Progression evaluator.
//!
//! Decides whether an exercise's next prescribed weight or duration should go
//! up, based on how many fully completed sessions fall inside a trailing
//! window of `days_before_increase` days.
//!
//! Both branches share [`windowed_qualifying_count`]; the exercise kind picks
//! exactly one branch.
//!
//! ```text
//! cutoff = now - window days
//! qualifying = entries with timestamp > cutoff && was_completed
//! increase  <=> qualifying >= window            (window > 0)
//! increase  <=> any completed entry exists       (window <= 0)
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProgressionError;
use crate::model::{CompletionLogEntry, Exercise, ExerciseKind};

/// A recommendation for the next session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Progression {
    /// Timed hold. `next_ms` is 0 when nothing is planned.
    Duration {
        current_ms: Option<u64>,
        next_ms: u64,
        increased: bool,
    },
    /// Weight and reps. The caller adds `increment` when `increase` is set.
    Weight {
        increase: bool,
        increment: f64,
        next_weight: Option<f64>,
    },
}

impl Progression {
    pub fn is_increase(&self) -> bool {
        match self {
            Self::Duration { increased, .. } => *increased,
            Self::Weight { increase, .. } => *increase,
        }
    }
}

/// Completed entries newer than `now - window_days`.
///
/// Entries are not deduplicated by day. A non-positive window, or one too
/// large to represent, counts every completed entry.
pub fn windowed_qualifying_count(
    history: &[CompletionLogEntry],
    window_days: i64,
    now: DateTime<Utc>,
) -> usize {
    let cutoff = if window_days > 0 {
        Duration::try_days(window_days).and_then(|d| now.checked_sub_signed(d))
    } else {
        None
    };
    history
        .iter()
        .filter(|e| e.was_completed)
        .filter(|e| cutoff.map_or(true, |c| e.timestamp > c))
        .count()
}

/// Whether the qualifying streak for `window_days` has been reached.
pub fn threshold_met(history: &[CompletionLogEntry], window_days: i64, now: DateTime<Utc>) -> bool {
    let count = windowed_qualifying_count(history, window_days, now);
    if window_days <= 0 {
        return count > 0;
    }
    count as u64 >= window_days as u64
}

/// Next planned duration for a timed hold.
///
/// Returns 0 when the exercise has no planned duration.
pub fn next_planned_duration(exercise: &Exercise, now: DateTime<Utc>) -> Result<u64, ProgressionError> {
    let ExerciseKind::TimedHold {
        planned_duration_ms,
        auto_increase_duration_ms,
    } = exercise.kind
    else {
        return Err(ProgressionError::UnsupportedKind {
            kind: exercise.kind.name(),
        });
    };
    let increment = auto_increase_duration_ms
        .filter(|ms| *ms > 0)
        .ok_or(ProgressionError::NotConfigured {
            kind: exercise.kind.name(),
        })?;
    let Some(current) = planned_duration_ms else {
        return Ok(0);
    };
    if threshold_met(exercise.history(), exercise.days_before_increase, now) {
        Ok(current.saturating_add(increment))
    } else {
        Ok(current)
    }
}

/// Whether the planned weight should go up. Applying the increment is up to
/// the caller.
pub fn should_increase_weight(exercise: &Exercise, now: DateTime<Utc>) -> Result<bool, ProgressionError> {
    let ExerciseKind::WeightAndReps {
        auto_increase_weight,
        ..
    } = exercise.kind
    else {
        return Err(ProgressionError::UnsupportedKind {
            kind: exercise.kind.name(),
        });
    };
    if !auto_increase_weight.is_some_and(|w| w > 0.0) {
        return Err(ProgressionError::NotConfigured {
            kind: exercise.kind.name(),
        });
    }
    Ok(threshold_met(exercise.history(), exercise.days_before_increase, now))
}

/// Evaluate whichever branch the exercise kind selects.
pub fn evaluate(exercise: &Exercise, now: DateTime<Utc>) -> Result<Progression, ProgressionError> {
    let progression = match exercise.kind {
        ExerciseKind::TimedHold {
            planned_duration_ms, ..
        } => {
            let next_ms = next_planned_duration(exercise, now)?;
            Progression::Duration {
                current_ms: planned_duration_ms,
                next_ms,
                increased: planned_duration_ms.is_some_and(|c| next_ms > c),
            }
        }
        ExerciseKind::WeightAndReps {
            planned_weight,
            auto_increase_weight,
        } => {
            let increase = should_increase_weight(exercise, now)?;
            let increment = auto_increase_weight.unwrap_or_default();
            Progression::Weight {
                increase,
                increment,
                next_weight: planned_weight.map(|w| if increase { w + increment } else { w }),
            }
        }
        _ => {
            return Err(ProgressionError::UnsupportedKind {
                kind: exercise.kind.name(),
            })
        }
    };
    tracing::info!(
        exercise = %exercise.name,
        window_days = exercise.days_before_increase,
        increase = progression.is_increase(),
        "progression evaluated"
    );
    Ok(progression)
}
