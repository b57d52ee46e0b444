//! Integration tests for the progression evaluator.

use chrono::{DateTime, Duration, Utc};
use setwise_core::progression::{
    evaluate, next_planned_duration, should_increase_weight, windowed_qualifying_count,
};
use setwise_core::{CompletionLogEntry, Exercise, ExerciseKind, Progression, ProgressionError};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-05-20T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn plank(days_before_increase: i64) -> Exercise {
    Exercise::new(
        "Plank",
        ExerciseKind::TimedHold {
            planned_duration_ms: Some(60_000),
            auto_increase_duration_ms: Some(30_000),
        },
    )
    .with_days_before_increase(days_before_increase)
}

fn bench(days_before_increase: i64) -> Exercise {
    Exercise::new(
        "Bench Press",
        ExerciseKind::WeightAndReps {
            planned_weight: Some(60.0),
            auto_increase_weight: Some(2.5),
        },
    )
    .with_days_before_increase(days_before_increase)
}

fn log(ex: &mut Exercise, days_ago: i64, was_completed: bool) {
    let id = ex.id.clone();
    let at = now() - Duration::days(days_ago) + Duration::minutes(1);
    ex.push_history(CompletionLogEntry::new(&id, at, Vec::new(), was_completed));
}

#[test]
fn test_timed_hold_increases_after_two_days() {
    let mut ex = plank(2);
    log(&mut ex, 1, true);
    log(&mut ex, 0, true);

    assert_eq!(next_planned_duration(&ex, now()).unwrap(), 90_000);
    assert_eq!(
        evaluate(&ex, now()).unwrap(),
        Progression::Duration {
            current_ms: Some(60_000),
            next_ms: 90_000,
            increased: true,
        }
    );
}

#[test]
fn test_four_day_window_needs_four_entries() {
    let mut ex = bench(4);
    for days_ago in 0..3 {
        log(&mut ex, days_ago, true);
    }
    assert!(!should_increase_weight(&ex, now()).unwrap());

    log(&mut ex, 3, true);
    assert!(should_increase_weight(&ex, now()).unwrap());
    assert_eq!(
        evaluate(&ex, now()).unwrap(),
        Progression::Weight {
            increase: true,
            increment: 2.5,
            next_weight: Some(62.5),
        }
    );
}

#[test]
fn test_incomplete_entries_never_count() {
    let mut ex = bench(4);
    for days_ago in 0..3 {
        log(&mut ex, days_ago, true);
    }
    for _ in 0..5 {
        log(&mut ex, 0, false);
    }
    assert_eq!(windowed_qualifying_count(ex.history(), 4, now()), 3);
    assert!(!should_increase_weight(&ex, now()).unwrap());
}

#[test]
fn test_entries_outside_window_are_ignored() {
    let mut ex = plank(2);
    log(&mut ex, 0, true);
    log(&mut ex, 5, true);
    log(&mut ex, 9, true);

    assert_eq!(windowed_qualifying_count(ex.history(), 2, now()), 1);
    assert_eq!(next_planned_duration(&ex, now()).unwrap(), 60_000);
}

#[test]
fn test_non_positive_window_needs_any_completion() {
    let mut ex = plank(0);
    assert_eq!(next_planned_duration(&ex, now()).unwrap(), 60_000);
    log(&mut ex, 400, false);
    assert_eq!(next_planned_duration(&ex, now()).unwrap(), 60_000);
    log(&mut ex, 400, true);
    assert_eq!(next_planned_duration(&ex, now()).unwrap(), 90_000);

    let mut negative = bench(-3);
    log(&mut negative, 30, true);
    assert!(should_increase_weight(&negative, now()).unwrap());
}

#[test]
fn test_missing_increment_is_not_configured() {
    let ex = Exercise::new(
        "Wall Sit",
        ExerciseKind::TimedHold {
            planned_duration_ms: Some(45_000),
            auto_increase_duration_ms: None,
        },
    );
    assert!(matches!(
        next_planned_duration(&ex, now()),
        Err(ProgressionError::NotConfigured { kind: "timed_hold" })
    ));

    let ex = Exercise::new(
        "Curl",
        ExerciseKind::WeightAndReps {
            planned_weight: Some(12.0),
            auto_increase_weight: Some(0.0),
        },
    );
    assert!(matches!(
        should_increase_weight(&ex, now()),
        Err(ProgressionError::NotConfigured { .. })
    ));
}

#[test]
fn test_wrong_kind_is_rejected() {
    let run = Exercise::new("Run", ExerciseKind::Cardio);
    assert!(matches!(
        evaluate(&run, now()),
        Err(ProgressionError::UnsupportedKind { kind: "cardio" })
    ));
    assert!(matches!(
        next_planned_duration(&bench(4), now()),
        Err(ProgressionError::UnsupportedKind { .. })
    ));
    assert!(matches!(
        should_increase_weight(&plank(4), now()),
        Err(ProgressionError::UnsupportedKind { .. })
    ));
}

#[test]
fn test_unplanned_duration_yields_zero() {
    let mut ex = Exercise::new(
        "Hollow Hold",
        ExerciseKind::TimedHold {
            planned_duration_ms: None,
            auto_increase_duration_ms: Some(10_000),
        },
    )
    .with_days_before_increase(1);
    log(&mut ex, 0, true);
    assert_eq!(next_planned_duration(&ex, now()).unwrap(), 0);
    assert!(!evaluate(&ex, now()).unwrap().is_increase());
}
