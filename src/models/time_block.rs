use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A closed interval during which a tag was continuously on a reader.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimeBlock {
    pub tag_id: String,
    pub project_name: Option<String>,
    pub task_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: f64,
    /// Day of `start_time` in the reference timezone.
    pub activity_date: NaiveDate,
}

impl TimeBlock {
    pub fn is_labeled(&self) -> bool {
        self.project_name.is_some()
    }

    pub fn is_zero_duration(&self) -> bool {
        self.duration_minutes <= 0.0
    }
}

/// A tag currently on a reader (INSERT with no REMOVE yet).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OpenSession {
    pub tag_id: String,
    pub device_id: String,
    pub project_name: Option<String>,
    pub task_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub activity_date: NaiveDate,
}

impl OpenSession {
    /// Minutes elapsed between the session start and `now`, never negative.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        let secs = (now - self.start_time).num_seconds().max(0);
        secs as f64 / 60.0
    }
}
