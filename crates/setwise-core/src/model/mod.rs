//! Workout records: sets, exercises, workouts and their logs.

mod exercise;
mod set;
mod workout;

pub use exercise::{CompletionLogEntry, Exercise, ExerciseKind, DEFAULT_DAYS_BEFORE_INCREASE};
pub use set::{Set, SetStatus};
pub use workout::{ExerciseOutcome, Workout, WorkoutLog};
