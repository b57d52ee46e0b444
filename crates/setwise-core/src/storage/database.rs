//! SQLite-based record store.
//!
//! Provides persistent storage for:
//! - Exercises (with their sets and completion history)
//! - Workouts (with their session logs)
//! - Key-value store for application state such as the running session
//!
//! Records are stored as JSON documents addressed by id.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::model::{Exercise, Workout};

const EXERCISES: &str = "exercises";
const WORKOUTS: &str = "workouts";

/// SQLite database for workout records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/setwise.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("setwise.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS exercises (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                doc         TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS workouts (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                doc         TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_exercises_name ON exercises(name);
            CREATE INDEX IF NOT EXISTS idx_workouts_name ON workouts(name);",
        )?;
        Ok(())
    }

    // ── Exercises ────────────────────────────────────────────────────

    pub fn save_exercise(&self, exercise: &Exercise) -> Result<(), DatabaseError> {
        self.put_doc(EXERCISES, &exercise.id, &exercise.name, exercise)
    }

    pub fn load_exercise(&self, id: &str) -> Result<Option<Exercise>, DatabaseError> {
        self.get_doc(EXERCISES, id)
    }

    pub fn list_exercises(&self) -> Result<Vec<Exercise>, DatabaseError> {
        self.list_docs(EXERCISES)
    }

    /// Look up by id first, then by case-insensitive name.
    pub fn find_exercise(&self, key: &str) -> Result<Option<Exercise>, DatabaseError> {
        if let Some(found) = self.load_exercise(key)? {
            return Ok(Some(found));
        }
        Ok(self
            .list_exercises()?
            .into_iter()
            .find(|e| e.name.eq_ignore_ascii_case(key)))
    }

    pub fn delete_exercise(&self, id: &str) -> Result<bool, DatabaseError> {
        let n = self
            .conn
            .execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    // ── Workouts ─────────────────────────────────────────────────────

    pub fn save_workout(&self, workout: &Workout) -> Result<(), DatabaseError> {
        self.put_doc(WORKOUTS, &workout.id, &workout.name, workout)
    }

    pub fn load_workout(&self, id: &str) -> Result<Option<Workout>, DatabaseError> {
        self.get_doc(WORKOUTS, id)
    }

    pub fn list_workouts(&self) -> Result<Vec<Workout>, DatabaseError> {
        self.list_docs(WORKOUTS)
    }

    pub fn find_workout(&self, key: &str) -> Result<Option<Workout>, DatabaseError> {
        if let Some(found) = self.load_workout(key)? {
            return Ok(Some(found));
        }
        Ok(self
            .list_workouts()?
            .into_iter()
            .find(|w| w.name.eq_ignore_ascii_case(key)))
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn put_doc<T: Serialize>(
        &self,
        table: &'static str,
        id: &str,
        name: &str,
        doc: &T,
    ) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(doc).map_err(|e| DatabaseError::CorruptRecord {
            id: id.to_string(),
            message: e.to_string(),
        })?;
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {table} (id, name, doc, updated_at) VALUES (?1, ?2, ?3, ?4)"
            ),
            params![id, name, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn get_doc<T: DeserializeOwned>(
        &self,
        table: &'static str,
        id: &str,
    ) -> Result<Option<T>, DatabaseError> {
        let json = self
            .conn
            .query_row(
                &format!("SELECT doc FROM {table} WHERE id = ?1"),
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        json.map(|j| decode(id, &j)).transpose()
    }

    fn list_docs<T: DeserializeOwned>(&self, table: &'static str) -> Result<Vec<T>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, doc FROM {table} ORDER BY name, id"))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut docs = Vec::new();
        for row in rows {
            let (id, json) = row?;
            docs.push(decode(&id, &json)?);
        }
        Ok(docs)
    }
}

fn decode<T: DeserializeOwned>(id: &str, json: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(json).map_err(|e| DatabaseError::CorruptRecord {
        id: id.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExerciseKind, Set};

    fn plank() -> Exercise {
        Exercise::new(
            "Plank",
            ExerciseKind::TimedHold {
                planned_duration_ms: Some(60_000),
                auto_increase_duration_ms: Some(15_000),
            },
        )
        .with_planned_sets(2, Some(30_000))
    }

    #[test]
    fn exercise_roundtrip() {
        let db = Database::open_memory().unwrap();
        let mut ex = plank();
        ex.record_completion(Utc::now());
        db.save_exercise(&ex).unwrap();
        assert_eq!(db.load_exercise(&ex.id).unwrap(), Some(ex.clone()));
        assert!(db.load_exercise("missing").unwrap().is_none());
    }

    #[test]
    fn save_replaces_existing_document() {
        let db = Database::open_memory().unwrap();
        let mut ex = plank();
        db.save_exercise(&ex).unwrap();
        ex.add_set(Set::timed(0, 10_000));
        db.save_exercise(&ex).unwrap();
        let all = db.list_exercises().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sets.len(), 3);
    }

    #[test]
    fn find_exercise_by_name_ignores_case() {
        let db = Database::open_memory().unwrap();
        let ex = plank();
        db.save_exercise(&ex).unwrap();
        let found = db.find_exercise("plank").unwrap().unwrap();
        assert_eq!(found.id, ex.id);
        assert!(db.delete_exercise(&ex.id).unwrap());
        assert!(db.find_exercise("plank").unwrap().is_none());
    }

    #[test]
    fn workout_roundtrip() {
        let db = Database::open_memory().unwrap();
        let w = Workout::new("Core").with_exercise(plank());
        db.save_workout(&w).unwrap();
        assert_eq!(db.find_workout("core").unwrap(), Some(w));
    }

    #[test]
    fn corrupt_document_is_reported() {
        let db = Database::open_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO exercises (id, name, doc, updated_at) VALUES ('x', 'x', '{', '')",
                [],
            )
            .unwrap();
        assert!(matches!(
            db.load_exercise("x"),
            Err(DatabaseError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setwise.db");
        let ex = plank();
        Database::open_at(&path).unwrap().save_exercise(&ex).unwrap();
        let reopened = Database::open_at(&path).unwrap();
        assert_eq!(reopened.load_exercise(&ex.id).unwrap(), Some(ex));
    }
}
