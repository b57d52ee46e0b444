//! Property tests for pause accounting.
//!
//! Arbitrary pause/resume/tick sequences are replayed against a simulated
//! clock while an independent tally tracks how long the timer spent paused.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use setwise_core::{IntervalTimer, Set, TimerState};

#[derive(Debug, Clone, Copy)]
enum Op {
    Tick,
    Pause,
    Resume,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Tick), Just(Op::Pause), Just(Op::Resume)]
}

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-04-01T07:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Target far beyond any generated sequence so the timer never finishes.
const TARGET_MS: u64 = 24 * 60 * 60 * 1000;

fn replay(steps: &[(Op, u16)]) -> (IntervalTimer, DateTime<Utc>, u64) {
    let mut timer = IntervalTimer::new();
    let mut now = t0();
    timer.start(Set::timed(0, TARGET_MS), TARGET_MS, now).unwrap();

    let mut paused_ms = 0u64;
    for &(op, delay) in steps {
        if timer.state() == TimerState::Paused {
            paused_ms += u64::from(delay);
        }
        now += Duration::milliseconds(i64::from(delay));
        match op {
            Op::Tick => {
                timer.tick(now);
            }
            Op::Pause => {
                let _ = timer.pause(now);
            }
            Op::Resume => {
                let _ = timer.resume(now);
            }
        }
    }
    (timer, now, paused_ms)
}

proptest! {
    #[test]
    fn effective_equals_wall_minus_paused(steps in prop::collection::vec((op(), 0u16..5_000), 0..60)) {
        let (timer, now, paused_ms) = replay(&steps);
        let wall_ms = (now - t0()).num_milliseconds() as u64;

        prop_assert_eq!(timer.paused_ms(now), paused_ms);
        prop_assert_eq!(timer.effective_duration_ms(now), wall_ms - paused_ms);
        prop_assert!(timer.bound_set().unwrap().pauses.is_well_formed());
    }

    #[test]
    fn open_pause_keeps_growing_until_resumed(
        steps in prop::collection::vec((op(), 0u16..5_000), 0..40),
        extra in 1u16..10_000,
    ) {
        let (mut timer, now, paused_ms) = replay(&steps);
        let later = now + Duration::milliseconds(i64::from(extra));
        let expected = if timer.state() == TimerState::Paused {
            paused_ms + u64::from(extra)
        } else {
            paused_ms
        };
        prop_assert_eq!(timer.paused_ms(later), expected);

        // Elapsed accrual only counts running time.
        timer.tick(later);
        let wall_ms = (later - t0()).num_milliseconds() as u64;
        if timer.state() == TimerState::Running {
            prop_assert_eq!(timer.elapsed_ms(), wall_ms - expected);
        }
    }

    #[test]
    fn stop_completed_duration_matches_running_time(steps in prop::collection::vec((op(), 0u16..5_000), 0..60)) {
        let (mut timer, now, paused_ms) = replay(&steps);
        let wall_ms = (now - t0()).num_milliseconds() as u64;
        let (set, _) = timer.stop(true, now).unwrap();

        prop_assert_eq!(set.completed_duration_ms, Some(wall_ms - paused_ms));
        prop_assert!(!set.pauses.is_paused());
        prop_assert_eq!(set.effective_duration_ms(now + Duration::hours(3)), wall_ms - paused_ms);
    }

    #[test]
    fn serialized_set_reproduces_effective_duration(
        steps in prop::collection::vec((op(), 0u16..5_000), 0..60),
        offset in 0i64..100_000,
    ) {
        let (timer, now, _) = replay(&steps);
        let set = timer.bound_set().unwrap().clone();
        let json = serde_json::to_string(&set).unwrap();
        let back: Set = serde_json::from_str(&json).unwrap();

        let at = now + Duration::milliseconds(offset);
        prop_assert_eq!(back.effective_duration_ms(at), set.effective_duration_ms(at));
        prop_assert_eq!(back, set);
    }
}
