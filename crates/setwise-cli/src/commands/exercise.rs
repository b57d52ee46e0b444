use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use setwise_core::{progression, Config, Database, Exercise, ExerciseKind};

use super::{find_exercise, print_json, timer, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Weight,
    Timed,
    Cardio,
    Bodyweight,
    Custom,
}

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// Create an exercise with planned sets
    Add {
        /// Exercise name
        name: String,
        #[arg(long, value_enum, default_value = "weight")]
        kind: KindArg,
        /// Planned weight (weight exercises)
        #[arg(long)]
        weight: Option<f64>,
        /// Planned hold in seconds (timed exercises)
        #[arg(long)]
        duration: Option<u64>,
        /// Auto-increase step: weight units, or seconds for timed holds.
        /// 0 disables progression.
        #[arg(long)]
        increase: Option<f64>,
        /// Trailing window in days before an increase
        #[arg(long, allow_hyphen_values = true)]
        days: Option<i64>,
        /// Number of planned sets
        #[arg(long, default_value = "3")]
        sets: u32,
        /// Rest after each set in seconds
        #[arg(long)]
        rest: Option<u64>,
        /// Label for custom exercises
        #[arg(long)]
        label: Option<String>,
    },
    /// List exercises
    List,
    /// Print one exercise as JSON
    Show {
        /// Exercise id or name
        exercise: String,
    },
    /// Evaluate progression for the next session
    Progress {
        /// Exercise id or name
        exercise: String,
    },
    /// Delete an exercise and drop it from every workout
    Remove {
        /// Exercise id or name
        exercise: String,
    },
}

#[derive(Serialize)]
struct ExerciseSummary<'a> {
    id: &'a str,
    name: &'a str,
    kind: &'static str,
    sets: usize,
    sessions: usize,
}

fn build_kind(
    kind: KindArg,
    weight: Option<f64>,
    duration: Option<u64>,
    increase: Option<f64>,
    label: Option<String>,
    config: &Config,
) -> ExerciseKind {
    match kind {
        KindArg::Weight => ExerciseKind::WeightAndReps {
            planned_weight: weight,
            auto_increase_weight: Some(increase.unwrap_or(config.progression.weight_increment))
                .filter(|w| *w > 0.0),
        },
        KindArg::Timed => {
            let step_secs = increase
                .map(|s| s.max(0.0) as u64)
                .unwrap_or(config.progression.duration_increment_secs);
            ExerciseKind::TimedHold {
                planned_duration_ms: duration.map(|s| s * 1000),
                auto_increase_duration_ms: Some(step_secs * 1000).filter(|ms| *ms > 0),
            }
        }
        KindArg::Cardio => ExerciseKind::Cardio,
        KindArg::Bodyweight => ExerciseKind::BodyweightReps,
        KindArg::Custom => ExerciseKind::Custom {
            label: label.unwrap_or_default(),
        },
    }
}

pub fn run(action: ExerciseAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        ExerciseAction::Add {
            name,
            kind,
            weight,
            duration,
            increase,
            days,
            sets,
            rest,
            label,
        } => {
            let config = Config::load()?;
            let kind = build_kind(kind, weight, duration, increase, label, &config);
            let rest_ms = rest.unwrap_or(config.timer.default_rest_secs) * 1000;
            let exercise = Exercise::new(name, kind)
                .with_days_before_increase(days.unwrap_or(config.progression.days_before_increase))
                .with_planned_sets(sets, Some(rest_ms));
            db.save_exercise(&exercise)?;
            tracing::info!(id = %exercise.id, name = %exercise.name, "exercise created");
            print_json(&exercise)?;
        }
        ExerciseAction::List => {
            let exercises = db.list_exercises()?;
            let summary: Vec<_> = exercises
                .iter()
                .map(|e| ExerciseSummary {
                    id: &e.id,
                    name: &e.name,
                    kind: e.kind.name(),
                    sets: e.sets.len(),
                    sessions: e.history().len(),
                })
                .collect();
            print_json(&summary)?;
        }
        ExerciseAction::Show { exercise } => {
            print_json(&find_exercise(&db, &exercise)?)?;
        }
        ExerciseAction::Progress { exercise } => {
            let exercise = find_exercise(&db, &exercise)?;
            let progression = progression::evaluate(&exercise, Utc::now())?;
            print_json(&progression)?;
        }
        ExerciseAction::Remove { exercise } => {
            let exercise = find_exercise(&db, &exercise)?;
            if timer::active_exercise(&db, Utc::now())?.as_deref() == Some(exercise.id.as_str()) {
                return Err(format!(
                    "a set of {} is still on the timer; stop or reset it first",
                    exercise.name
                )
                .into());
            }
            for mut workout in db.list_workouts()? {
                let before = workout.exercises.len();
                workout.exercises.retain(|e| e.id != exercise.id);
                if workout.exercises.len() != before {
                    db.save_workout(&workout)?;
                }
            }
            db.delete_exercise(&exercise.id)?;
            tracing::info!(id = %exercise.id, name = %exercise.name, "exercise removed");
            print_json(&exercise)?;
        }
    }
    Ok(())
}
