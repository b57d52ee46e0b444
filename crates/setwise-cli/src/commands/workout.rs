use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use setwise_core::{CoreError, Database, Workout};

use super::{find_exercise, print_json, timer, CmdResult};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Create an empty workout
    Create {
        /// Workout name
        name: String,
    },
    /// Add an existing exercise to a workout
    AddExercise {
        /// Workout id or name
        workout: String,
        /// Exercise id or name
        exercise: String,
    },
    /// List workouts
    List,
    /// Close the current session: log every exercise and apply progression
    Close {
        /// Workout id or name
        workout: String,
    },
}

#[derive(Serialize)]
struct WorkoutSummary<'a> {
    id: &'a str,
    name: &'a str,
    exercises: Vec<&'a str>,
    sessions: usize,
}

fn find_workout(db: &Database, key: &str) -> Result<Workout, CoreError> {
    db.find_workout(key)?.ok_or_else(|| CoreError::NotFound {
        kind: "workout",
        id: key.to_string(),
    })
}

/// Exercises are edited through their own records (the timer writes sets
/// back there), so the workout picks up their current state before closing.
fn refresh_exercises(db: &Database, workout: &mut Workout) -> Result<(), CoreError> {
    for slot in &mut workout.exercises {
        match db.load_exercise(&slot.id)? {
            Some(current) => *slot = current,
            None => tracing::warn!(id = %slot.id, "exercise record missing, using workout copy"),
        }
    }
    Ok(())
}

pub fn run(action: WorkoutAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        WorkoutAction::Create { name } => {
            let workout = Workout::new(name);
            db.save_workout(&workout)?;
            print_json(&workout)?;
        }
        WorkoutAction::AddExercise { workout, exercise } => {
            let mut workout = find_workout(&db, &workout)?;
            let exercise = find_exercise(&db, &exercise)?;
            if workout.exercise(&exercise.id).is_none() {
                workout.exercises.push(exercise);
                db.save_workout(&workout)?;
            }
            print_json(&workout)?;
        }
        WorkoutAction::List => {
            let workouts = db.list_workouts()?;
            let summary: Vec<_> = workouts
                .iter()
                .map(|w| WorkoutSummary {
                    id: &w.id,
                    name: &w.name,
                    exercises: w.exercises.iter().map(|e| e.name.as_str()).collect(),
                    sessions: w.log.len(),
                })
                .collect();
            print_json(&summary)?;
        }
        WorkoutAction::Close { workout } => {
            let now = Utc::now();
            let mut workout = find_workout(&db, &workout)?;
            if let Some(timed) = timer::active_exercise(&db, now)?
                .and_then(|id| workout.exercise(&id).map(|e| e.name.clone()))
            {
                return Err(format!(
                    "a set of {timed} is still on the timer; stop or reset it before closing"
                )
                .into());
            }
            refresh_exercises(&db, &mut workout)?;
            let outcomes = workout.close_session(now);
            for exercise in &workout.exercises {
                db.save_exercise(exercise)?;
            }
            db.save_workout(&workout)?;
            print_json(&outcomes)?;
        }
    }
    Ok(())
}
