//! Parsing of user-supplied schedule times (`DD/MM/YYYY HH:MM`) in one explicit, configured zone.
//!
//! The zone is always passed in; the process's ambient local time zone is never consulted.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Accepted input format, e.g. `31/12/2099 10:00`.
pub const SCHEDULE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("expected DD/MM/YYYY HH:MM, got {0:?}")]
    Format(String),

    #[error("{requested} is not in the future")]
    NotInFuture { requested: DateTime<Utc> },
}

/// Parses `input` as a wall-clock time at `offset` and requires it to be strictly after `now`.
pub fn parse_schedule_time(
    input: &str,
    offset: &FixedOffset,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = input.trim();
    let naive = NaiveDateTime::parse_from_str(trimmed, SCHEDULE_TIME_FORMAT)
        .map_err(|_| TimeParseError::Format(trimmed.to_string()))?;
    let local = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| TimeParseError::Format(trimmed.to_string()))?;
    let requested = local.with_timezone(&Utc);

    if requested <= now {
        return Err(TimeParseError::NotInFuture { requested });
    }
    Ok(requested)
}

/// Formats an instant as `DD/MM/YYYY HH:MM` at `offset`.
pub fn format_local(at: DateTime<Utc>, offset: &FixedOffset) -> String {
    at.with_timezone(offset).format(SCHEDULE_TIME_FORMAT).to_string()
}

/// Parses a UTC offset such as `+07:00`, `-03:30` or `Z`.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| "invalid offset".to_string());
    }
    s.parse::<FixedOffset>()
        .map_err(|e| format!("invalid UTC offset {:?}: {}", s, e))
}
