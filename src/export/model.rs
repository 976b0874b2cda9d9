// src/export/model.rs

use crate::models::event::Event;
use crate::models::time_block::TimeBlock;
use crate::utils::time::format_local;
use chrono_tz::Tz;
use serde::Serialize;

/// Flat row for time block export. Times are local to the reference timezone.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BlockExport {
    pub activity_date: String,
    pub tag_id: String,
    pub project_name: String,
    pub task_name: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: f64,
}

/// Flat row for raw event export.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EventExport {
    pub id: i64,
    pub timestamp: String,
    pub event_type: String,
    pub tag_id: String,
    pub device_id: String,
    pub tag_present: bool,
}

const LOCAL_FMT: &str = "%Y-%m-%dT%H:%M:%S%:z";

impl BlockExport {
    pub fn from_block(b: &TimeBlock, tz: &Tz) -> Self {
        Self {
            activity_date: b.activity_date.format("%Y-%m-%d").to_string(),
            tag_id: b.tag_id.clone(),
            project_name: b.project_name.clone().unwrap_or_default(),
            task_name: b.task_name.clone().unwrap_or_default(),
            start_time: format_local(&b.start_time, tz, LOCAL_FMT),
            end_time: format_local(&b.end_time, tz, LOCAL_FMT),
            duration_minutes: b.duration_minutes,
        }
    }
}

impl EventExport {
    pub fn from_event(e: &Event, tz: &Tz) -> Self {
        Self {
            id: e.id,
            timestamp: format_local(&e.timestamp, tz, LOCAL_FMT),
            event_type: e.kind.as_wire().to_string(),
            tag_id: e.tag_id.clone(),
            device_id: e.device_id.clone(),
            tag_present: e.tag_present,
        }
    }
}
