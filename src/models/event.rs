use super::event_kind::EventKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored device event. Immutable once written to the event store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Event {
    pub id: i64,
    pub tag_id: String,
    pub device_id: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub tag_present: bool,
}

impl Event {
    pub fn new(
        id: i64,
        tag_id: &str,
        device_id: &str,
        kind: EventKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tag_id: tag_id.to_string(),
            device_id: device_id.to_string(),
            kind,
            timestamp,
            tag_present: kind.implies_present(),
        }
    }
}

/// A validated event that has not been stored yet.
///
/// Produced by the ingestion boundary from a device payload; carries the
/// optional device diagnostics that the store keeps alongside the event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewEvent {
    pub tag_id: String,
    pub device_id: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub tag_present: bool,
    pub tag_type: Option<String>,
    pub wifi_status: Option<String>,
    pub time_status: Option<String>,
}

impl NewEvent {
    pub fn new(tag_id: &str, device_id: &str, kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            tag_id: tag_id.to_string(),
            device_id: device_id.to_string(),
            kind,
            timestamp,
            tag_present: kind.implies_present(),
            tag_type: None,
            wifi_status: None,
            time_status: None,
        }
    }

    /// Attach the id assigned by the store.
    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            tag_id: self.tag_id,
            device_id: self.device_id,
            kind: self.kind,
            timestamp: self.timestamp,
            tag_present: self.tag_present,
        }
    }
}
