//! Personal records derived from an exercise's completion history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Exercise, SetStatus};

/// Best values across every Completed set in the history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalRecords {
    pub exercise_id: String,
    pub heaviest_weight: Option<f64>,
    pub most_reps: Option<u32>,
    pub longest_duration_ms: Option<u64>,
    pub sessions: usize,
    pub completed_sessions: usize,
    pub last_session: Option<DateTime<Utc>>,
}

pub fn personal_records(exercise: &Exercise) -> PersonalRecords {
    let history = exercise.history();
    let mut records = PersonalRecords {
        exercise_id: exercise.id.clone(),
        sessions: history.len(),
        completed_sessions: history.iter().filter(|e| e.was_completed).count(),
        last_session: history.iter().map(|e| e.timestamp).max(),
        ..PersonalRecords::default()
    };

    let completed_sets = history
        .iter()
        .flat_map(|e| e.sets.iter())
        .filter(|s| s.status == SetStatus::Completed);

    for set in completed_sets {
        if let Some(w) = set.weight {
            if records.heaviest_weight.map_or(true, |best| w > best) {
                records.heaviest_weight = Some(w);
            }
        }
        if let Some(r) = set.completed_reps {
            records.most_reps = Some(records.most_reps.map_or(r, |best| best.max(r)));
        }
        if let Some(d) = set.completed_duration_ms {
            records.longest_duration_ms =
                Some(records.longest_duration_ms.map_or(d, |best| best.max(d)));
        }
    }
    records
}
