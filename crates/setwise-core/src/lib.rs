//! # Setwise Core Library
//!
//! Core logic for the Setwise workout tracker. The CLI is a thin host over
//! this library; nothing here renders output or talks to a network.
//!
//! ## Architecture
//!
//! - **Timers**: wall-clock-based state machines that take the current time
//!   as an argument. The host calls `tick()` periodically.
//! - **Progression**: decides when a planned weight or duration goes up,
//!   from completed sessions inside a trailing window.
//! - **Storage**: SQLite record store and TOML configuration.
//!
//! ## Key Components
//!
//! - [`PauseLedger`]: suspension intervals of one timed set
//! - [`IntervalTimer`]: Idle/Running/Paused/Finished state machine for a set
//! - [`RestTimer`]: countdown between sets
//! - [`Session`] / [`SessionDriver`]: both timers, a clock and observers
//! - [`progression`]: the progression evaluator
//! - [`Database`] / [`Config`]: persistence collaborators

pub mod clock;
pub mod error;
pub mod events;
pub mod model;
pub mod progression;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ProgressionError, Result, TimerError};
pub use events::Event;
pub use model::{
    CompletionLogEntry, Exercise, ExerciseKind, ExerciseOutcome, Set, SetStatus, Workout,
    WorkoutLog,
};
pub use progression::Progression;
pub use session::{Session, SessionDriver, Snapshot};
pub use stats::{personal_records, PersonalRecords};
pub use storage::{Config, Database};
pub use timer::{IntervalTimer, PauseInterval, PauseLedger, RestTimer, TimerState};
