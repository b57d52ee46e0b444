use setwise_core::{personal_records, Database};

use super::{find_exercise, print_json, CmdResult};

pub fn run(exercise: &str) -> CmdResult {
    let db = Database::open()?;
    let exercise = find_exercise(&db, exercise)?;
    print_json(&personal_records(&exercise))
}
