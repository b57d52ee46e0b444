//! Statistics derived from exercise history.

mod records;

pub use records::{personal_records, PersonalRecords};
