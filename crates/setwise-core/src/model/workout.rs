use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::exercise::Exercise;
use crate::error::{CoreError, Result};
use crate::progression::{self, Progression};

/// One closed session of a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: String,
    /// Earliest set start in the session, if any set was started.
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: DateTime<Utc>,
    pub exercise_ids: Vec<String>,
    pub completed_exercises: usize,
}

/// What closing a session did to one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseOutcome {
    pub exercise_id: String,
    pub was_completed: bool,
    /// `None` when the exercise has no progression configured.
    pub progression: Option<Progression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub log: Vec<WorkoutLog>,
}

impl Workout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            exercises: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn with_exercise(mut self, exercise: Exercise) -> Self {
        self.exercises.push(exercise);
        self
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn exercise_mut(&mut self, id: &str) -> Result<&mut Exercise> {
        self.exercises
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "exercise",
                id: id.to_string(),
            })
    }

    /// Close the running session.
    ///
    /// Every exercise gets a completion log entry, its sets go back to
    /// Planned, and its progression is evaluated against the updated history
    /// and merged into the planned fields.
    pub fn close_session(&mut self, now: DateTime<Utc>) -> Vec<ExerciseOutcome> {
        let started_at = self
            .exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter_map(|s| s.start_time)
            .min();

        let mut outcomes = Vec::with_capacity(self.exercises.len());
        for exercise in &mut self.exercises {
            let was_completed = exercise.record_completion(now).was_completed;
            exercise.reset_sets();

            let progression = match progression::evaluate(exercise, now) {
                Ok(p) => {
                    exercise.apply_progression(&p);
                    Some(p)
                }
                Err(err) => {
                    tracing::debug!(exercise = %exercise.name, %err, "no progression for exercise");
                    None
                }
            };

            outcomes.push(ExerciseOutcome {
                exercise_id: exercise.id.clone(),
                was_completed,
                progression,
            });
        }

        let completed_exercises = outcomes.iter().filter(|o| o.was_completed).count();
        self.log.push(WorkoutLog {
            id: uuid::Uuid::new_v4().to_string(),
            started_at,
            finished_at: now,
            exercise_ids: self.exercises.iter().map(|e| e.id.clone()).collect(),
            completed_exercises,
        });
        tracing::info!(
            workout = %self.name,
            exercises = self.exercises.len(),
            completed_exercises,
            "session closed"
        );
        outcomes
    }
}
