pub mod category;
pub mod event;
pub mod task;

use busybee_core::{Config, ScheduleStore};
use chrono::{NaiveDate, NaiveDateTime};

/// Open the store at the configured database path.
pub fn open_store() -> Result<ScheduleStore, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    Ok(ScheduleStore::open(config.database_path()?)?)
}

/// Parse a user-supplied instant: `2024-03-01T09:30`, with or without
/// seconds, or a bare date (midnight).
pub fn parse_instant(raw: &str) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(format!("cannot parse '{raw}' as a date/time (expected YYYY-MM-DD[THH:MM])").into())
}
