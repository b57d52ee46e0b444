use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::set::{Set, SetStatus};
use crate::error::{CoreError, Result};
use crate::progression::Progression;

/// Default trailing window, in days, for auto-increase.
pub const DEFAULT_DAYS_BEFORE_INCREASE: i64 = 4;

/// What kind of exercise this is, with only the progression fields that make
/// sense for that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseKind {
    WeightAndReps {
        #[serde(default)]
        planned_weight: Option<f64>,
        #[serde(default)]
        auto_increase_weight: Option<f64>,
    },
    TimedHold {
        #[serde(default)]
        planned_duration_ms: Option<u64>,
        #[serde(default)]
        auto_increase_duration_ms: Option<u64>,
    },
    Cardio,
    BodyweightReps,
    Custom {
        #[serde(default)]
        label: String,
    },
}

impl ExerciseKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WeightAndReps { .. } => "weight_and_reps",
            Self::TimedHold { .. } => "timed_hold",
            Self::Cardio => "cardio",
            Self::BodyweightReps => "bodyweight_reps",
            Self::Custom { .. } => "custom",
        }
    }

    /// Sets of this kind are driven by the interval timer.
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::TimedHold { .. } | Self::Cardio)
    }
}

/// Snapshot of one exercise taken when a session closes. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub exercise_id: String,
    pub sets: Vec<Set>,
    pub was_completed: bool,
}

impl CompletionLogEntry {
    pub fn new(
        exercise_id: &str,
        timestamp: DateTime<Utc>,
        sets: Vec<Set>,
        was_completed: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            exercise_id: exercise_id.to_string(),
            sets,
            was_completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub kind: ExerciseKind,
    #[serde(default)]
    pub sets: Vec<Set>,
    #[serde(default = "default_days_before_increase")]
    pub days_before_increase: i64,
    #[serde(default)]
    history: Vec<CompletionLogEntry>,
}

fn default_days_before_increase() -> i64 {
    DEFAULT_DAYS_BEFORE_INCREASE
}

impl Exercise {
    pub fn new(name: impl Into<String>, kind: ExerciseKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            sets: Vec::new(),
            days_before_increase: DEFAULT_DAYS_BEFORE_INCREASE,
            history: Vec::new(),
        }
    }

    pub fn with_days_before_increase(mut self, days: i64) -> Self {
        self.days_before_increase = days;
        self
    }

    /// Append `count` planned sets shaped after the exercise's kind.
    pub fn with_planned_sets(mut self, count: u32, rest_ms: Option<u64>) -> Self {
        for _ in 0..count {
            let order = self.sets.len() as u32;
            let set = match &self.kind {
                ExerciseKind::TimedHold { planned_duration_ms, .. } => Set {
                    target_duration_ms: *planned_duration_ms,
                    ..Set::new(order)
                },
                ExerciseKind::WeightAndReps { planned_weight, .. } => Set {
                    target_weight: *planned_weight,
                    ..Set::new(order)
                },
                _ => Set::new(order),
            };
            self.sets.push(set.with_rest_ms(rest_ms.unwrap_or(0)));
        }
        self
    }

    pub fn add_set(&mut self, mut set: Set) -> &Set {
        set.order = self.sets.len() as u32;
        self.sets.push(set);
        &self.sets[self.sets.len() - 1]
    }

    pub fn set(&self, set_id: &str) -> Option<&Set> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    /// The set at position `order`, if any.
    pub fn set_at(&self, order: u32) -> Option<&Set> {
        self.sets.iter().find(|s| s.order == order)
    }

    /// First set still waiting to be performed.
    pub fn next_planned_set(&self) -> Option<&Set> {
        self.sets.iter().find(|s| s.status == SetStatus::Planned)
    }

    /// Replace the stored set with the same id.
    pub fn replace_set(&mut self, set: Set) -> Result<()> {
        let slot = self
            .sets
            .iter_mut()
            .find(|s| s.id == set.id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "set",
                id: set.id.clone(),
            })?;
        *slot = set;
        Ok(())
    }

    pub fn planned_duration_ms(&self) -> Option<u64> {
        match self.kind {
            ExerciseKind::TimedHold { planned_duration_ms, .. } => planned_duration_ms,
            _ => None,
        }
    }

    pub fn planned_weight(&self) -> Option<f64> {
        match self.kind {
            ExerciseKind::WeightAndReps { planned_weight, .. } => planned_weight,
            _ => None,
        }
    }

    pub fn history(&self) -> &[CompletionLogEntry] {
        &self.history
    }

    /// All sets Completed, and at least one set exists.
    pub fn all_sets_completed(&self) -> bool {
        !self.sets.is_empty() && self.sets.iter().all(|s| s.status == SetStatus::Completed)
    }

    /// Append a snapshot of the current sets to the history.
    pub fn record_completion(&mut self, now: DateTime<Utc>) -> &CompletionLogEntry {
        let entry =
            CompletionLogEntry::new(&self.id, now, self.sets.clone(), self.all_sets_completed());
        self.history.push(entry);
        &self.history[self.history.len() - 1]
    }

    /// Append an externally built entry. History is append-only.
    pub fn push_history(&mut self, entry: CompletionLogEntry) {
        self.history.push(entry);
    }

    pub fn reset_sets(&mut self) {
        for set in &mut self.sets {
            set.reset_for_next_session();
        }
    }

    /// Merge a progression recommendation into the planned fields and the
    /// targets of every still-Planned set.
    pub fn apply_progression(&mut self, progression: &Progression) {
        match (&mut self.kind, progression) {
            (
                ExerciseKind::TimedHold { planned_duration_ms, .. },
                Progression::Duration { next_ms, increased: true, .. },
            ) => {
                if planned_duration_ms.is_none() {
                    return;
                }
                *planned_duration_ms = Some(*next_ms);
                for set in self.sets.iter_mut().filter(|s| s.status == SetStatus::Planned) {
                    set.target_duration_ms = Some(*next_ms);
                }
                tracing::info!(exercise = %self.name, next_ms, "planned duration increased");
            }
            (
                ExerciseKind::WeightAndReps { planned_weight, .. },
                Progression::Weight { increase: true, increment, .. },
            ) => {
                if let Some(w) = planned_weight.as_mut() {
                    *w += increment;
                }
                for set in self.sets.iter_mut().filter(|s| s.status == SetStatus::Planned) {
                    if let Some(w) = set.target_weight.as_mut() {
                        *w += increment;
                    }
                }
                tracing::info!(exercise = %self.name, increment, "planned weight increased");
            }
            _ => {}
        }
    }
}
