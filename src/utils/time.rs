//! Time utilities: parsing CLI instants, local rendering.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

fn resolve_local(naive: NaiveDateTime, tz: &Tz, raw: &str) -> AppResult<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::InvalidTimestamp(format!("{raw} does not exist in {tz}")))
}

/// Parse an instant given on the command line.
///
/// - RFC 3339 with offset → exact instant
/// - `YYYY-MM-DD HH:MM[:SS]` → local time in `tz`
/// - `HH:MM` → today, local time in `tz`
pub fn parse_at(raw: &str, tz: &Tz) -> AppResult<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return resolve_local(naive, tz, raw);
        }
    }

    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M") {
        let today = Utc::now().with_timezone(tz).date_naive();
        return resolve_local(today.and_time(t), tz, raw);
    }

    Err(AppError::InvalidTimestamp(raw.to_string()))
}

/// Render an instant in the reference timezone.
pub fn format_local(ts: &DateTime<Utc>, tz: &Tz, fmt: &str) -> String {
    ts.with_timezone(tz).format(fmt).to_string()
}
