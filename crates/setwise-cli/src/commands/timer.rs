use std::error::Error;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use setwise_core::{Config, CoreError, Database, Event, Session, Set, Snapshot, TimerState};

use super::{find_exercise, print_json, CmdResult};

const SESSION_KEY: &str = "session";
const EXERCISE_KEY: &str = "session_exercise";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start timing a set of an exercise
    Start {
        /// Exercise id or name
        exercise: String,
        /// Set position (0-based); defaults to the next planned set
        #[arg(long)]
        set: Option<u32>,
        /// Override the target duration in seconds
        #[arg(long)]
        secs: Option<u64>,
    },
    /// Pause the running set
    Pause,
    /// Resume the paused set
    Resume,
    /// Stop the set before its target
    Stop {
        /// Record the accrued time as-is, without an early-stop note
        #[arg(long)]
        completed: bool,
    },
    /// Abandon the current set and return it to Planned
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Skip the running rest
    SkipRest,
    /// Drive the timer in the foreground until the set and its rest finish
    Run,
}

#[derive(Serialize)]
struct Report {
    events: Vec<Event>,
    snapshot: Snapshot,
}

fn load_session(db: &Database) -> Session {
    if let Ok(Some(json)) = db.kv_get(SESSION_KEY) {
        match serde_json::from_str::<Session>(&json) {
            Ok(session) => return session,
            Err(e) => tracing::warn!(%e, "stored session unreadable, starting fresh"),
        }
    }
    Session::new()
}

fn save_session(db: &Database, session: &Session) -> CmdResult {
    let json = serde_json::to_string(session)?;
    db.kv_set(SESSION_KEY, &json)?;
    Ok(())
}

/// Store `set` back into the exercise the session was started for.
fn write_back(db: &Database, set: Set) -> Result<(), CoreError> {
    let Some(exercise_id) = db.kv_get(EXERCISE_KEY)? else {
        tracing::warn!(set_id = %set.id, "no exercise bound to session, set not recorded");
        return Ok(());
    };
    let mut exercise = find_exercise(db, &exercise_id)?;
    exercise.replace_set(set)?;
    db.save_exercise(&exercise)?;
    Ok(())
}

fn pick_set(db: &Database, exercise: &str, order: Option<u32>) -> Result<(String, Set), CoreError> {
    let exercise = find_exercise(db, exercise)?;
    let set = match order {
        Some(order) => exercise.set_at(order),
        None => exercise.next_planned_set(),
    }
    .cloned()
    .ok_or_else(|| CoreError::NotFound {
        kind: "set",
        id: order.map_or_else(|| format!("{}: no planned set", exercise.name), |o| o.to_string()),
    })?;
    Ok((exercise.id, set))
}

fn report(session: &Session, events: Vec<Event>, now: DateTime<Utc>) -> CmdResult {
    print_json(&Report {
        events,
        snapshot: session.snapshot(now),
    })
}

/// Advance the stored session to `now`. A set whose target passed since the
/// last command finishes at its target, starts its rest and is written back.
fn catch_up(db: &Database, session: &mut Session, now: DateTime<Utc>) -> Result<Vec<Event>, CoreError> {
    let events = session.tick(now);
    if let Some(set) = session.take_finished() {
        write_back(db, set)?;
    }
    Ok(events)
}

/// Exercise whose set is still on the clock, after catching the stored
/// session up to `now`.
pub(super) fn active_exercise(db: &Database, now: DateTime<Utc>) -> Result<Option<String>, Box<dyn Error>> {
    let mut session = load_session(db);
    catch_up(db, &mut session, now)?;
    save_session(db, &session)?;
    if !session.interval().is_active() {
        return Ok(None);
    }
    Ok(db.kv_get(EXERCISE_KEY)?)
}

pub fn run(action: TimerAction) -> CmdResult {
    let db = Database::open()?;
    let mut session = load_session(&db);
    let now = Utc::now();
    let caught_up = catch_up(&db, &mut session, now)?;

    let result = apply(&db, &mut session, action, caught_up, now);
    save_session(&db, &session)?;
    result
}

fn apply(
    db: &Database,
    session: &mut Session,
    action: TimerAction,
    mut events: Vec<Event>,
    now: DateTime<Utc>,
) -> CmdResult {
    match action {
        TimerAction::Start { exercise, set, secs } => {
            let (exercise_id, set) = pick_set(db, &exercise, set)?;
            events.extend(session.start_set(set, secs.map(|s| s * 1000), now)?);
            db.kv_set(EXERCISE_KEY, &exercise_id)?;
            if let Some(bound) = session.interval().bound_set() {
                write_back(db, bound.clone())?;
            }
        }
        TimerAction::Pause => events.extend(session.pause(now)?),
        TimerAction::Resume => events.extend(session.resume(now)?),
        TimerAction::Stop { completed } => {
            let (set, stopped) = session.stop(completed, now)?;
            write_back(db, set)?;
            events.extend(stopped);
        }
        TimerAction::Reset => {
            let (set, reset) = session.reset(now);
            if let Some(set) = set {
                write_back(db, set)?;
            }
            events.extend(reset);
        }
        TimerAction::Status => {}
        TimerAction::SkipRest => events.extend(session.skip_rest(now)),
        TimerAction::Run => {
            emit(&events)?;
            let tick_ms = Config::load_or_default().timer.tick_interval_ms;
            return drive(db, session, tick_ms);
        }
    }
    report(session, events, now)
}

/// Tick the session until neither the set nor its rest is running. Ctrl-C
/// pauses a running set and returns.
fn drive(db: &Database, session: &mut Session, tick_ms: u64) -> CmdResult {
    if session.interval().state() == TimerState::Paused {
        emit(&session.resume(Utc::now())?)?;
    }
    if !session.interval().is_active() && !session.rest().is_resting() {
        return report(session, Vec::new(), Utc::now());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms.max(10)));
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    emit(&session.tick(Utc::now()))?;
                    if let Some(set) = session.take_finished() {
                        write_back(db, set)?;
                        save_session(db, session)?;
                    }
                    if !session.interval().is_active() && !session.rest().is_resting() {
                        break;
                    }
                }
                _ = &mut ctrl_c => {
                    if session.interval().state() == TimerState::Running {
                        emit(&session.pause(Utc::now())?)?;
                    }
                    tracing::info!("interrupted, session saved");
                    break;
                }
            }
        }
        Ok::<(), Box<dyn Error>>(())
    })?;
    report(session, Vec::new(), Utc::now())
}

/// One compact JSON line per event while running in the foreground.
fn emit(events: &[Event]) -> CmdResult {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
