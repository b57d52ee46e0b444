pub mod config;
pub mod exercise;
pub mod records;
pub mod timer;
pub mod workout;

use serde::Serialize;
use setwise_core::{CoreError, Database, Exercise};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve an exercise by id or case-insensitive name.
pub fn find_exercise(db: &Database, key: &str) -> Result<Exercise, CoreError> {
    db.find_exercise(key)?.ok_or_else(|| CoreError::NotFound {
        kind: "exercise",
        id: key.to_string(),
    })
}
