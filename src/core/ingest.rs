//! Ingestion boundary: device payloads → validated events.
//!
//! Everything that can be wrong with a record is caught here, one record at a
//! time. A bad record is dropped and logged; it never fails the batch and never
//! reaches the aggregator.

use crate::errors::{AppError, AppResult};
use crate::models::device::DeviceAssignment;
use crate::models::event::NewEvent;
use crate::models::event_kind::EventKind;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Body of a device webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DevicePayload {
    pub timestamp: String,
    pub event_type: String,
    pub tag_present: bool,
    pub tag_id: String,
    pub device_id: String,
    #[serde(default)]
    pub tag_type: Option<String>,
    #[serde(default)]
    pub wifi_status: Option<String>,
    #[serde(default)]
    pub time_status: Option<String>,
}

/// A record dropped at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejected {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub accepted: Vec<NewEvent>,
    pub rejected: Vec<Rejected>,
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 instant. Offsets (or `Z`) are honoured; a datetime
/// without offset is taken as UTC.
pub fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    Err(AppError::InvalidTimestamp(raw.to_string()))
}

pub fn parse_event_kind(raw: &str) -> AppResult<EventKind> {
    EventKind::from_wire(raw).ok_or_else(|| {
        AppError::InvalidEventType(format!(
            "'{}' (expected 'tag_insert' or 'tag_removed')",
            raw
        ))
    })
}

fn non_blank(value: &str, field: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::InvalidEvent(format!("{field} is empty")));
    }
    Ok(v.to_string())
}

fn non_blank_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validate a single payload.
pub fn validate(payload: &DevicePayload) -> AppResult<NewEvent> {
    let kind = parse_event_kind(&payload.event_type)?;
    let timestamp = parse_timestamp(&payload.timestamp)?;
    let tag_id = non_blank(&payload.tag_id, "tag_id")?;
    let device_id = non_blank(&payload.device_id, "device_id")?;

    if payload.tag_present != kind.implies_present() {
        // devices report tag_present on their own; keep what they said
        tracing::debug!(
            tag_id = %tag_id,
            event_type = kind.as_wire(),
            tag_present = payload.tag_present,
            "tag_present disagrees with event type"
        );
    }

    Ok(NewEvent {
        tag_id,
        device_id,
        kind,
        timestamp,
        tag_present: payload.tag_present,
        tag_type: non_blank_opt(&payload.tag_type),
        wifi_status: non_blank_opt(&payload.wifi_status),
        time_status: non_blank_opt(&payload.time_status),
    })
}

/// Validate a batch of raw JSON records.
///
/// `known_devices` restricts accepted device ids; an empty directory accepts
/// every device.
pub fn validate_batch(
    records: &[serde_json::Value],
    known_devices: &[DeviceAssignment],
) -> IngestReport {
    let devices: HashSet<&str> = known_devices
        .iter()
        .map(|d| d.device_id.as_str())
        .filter(|id| !id.trim().is_empty())
        .collect();

    let mut report = IngestReport::default();

    for (index, record) in records.iter().enumerate() {
        let outcome = serde_json::from_value::<DevicePayload>(record.clone())
            .map_err(AppError::from)
            .and_then(|p| validate(&p))
            .and_then(|ev| {
                if devices.is_empty() || devices.contains(ev.device_id.as_str()) {
                    Ok(ev)
                } else {
                    Err(AppError::UnknownDevice(ev.device_id))
                }
            });

        match outcome {
            Ok(ev) => report.accepted.push(ev),
            Err(e) => {
                tracing::warn!(index, error = %e, "rejected device event");
                report.rejected.push(Rejected {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

/// Parse a JSON document holding either one payload object or an array of them.
pub fn parse_records(json: &str) -> AppResult<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    match value {
        serde_json::Value::Array(items) => Ok(items),
        obj @ serde_json::Value::Object(_) => Ok(vec![obj]),
        _ => Err(AppError::InvalidEvent(
            "expected a JSON object or an array of objects".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(event_type: &str, ts: &str) -> DevicePayload {
        DevicePayload {
            timestamp: ts.into(),
            event_type: event_type.into(),
            tag_present: event_type == "tag_insert",
            tag_id: "04:A2:1B".into(),
            device_id: "reader-01".into(),
            tag_type: Some("NTAG215".into()),
            wifi_status: None,
            time_status: Some("   ".into()),
        }
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 4, 9, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-04-09T12:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-04-09T14:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-04-09T12:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-04-09 12:00:00.000").unwrap(), expected);
        assert!(matches!(
            parse_timestamp("09/04/2025 12:00"),
            Err(AppError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_validate_accepts_good_payload() {
        let ev = validate(&payload("tag_removed", "2025-04-09T17:15:00.123Z")).unwrap();
        assert_eq!(ev.kind, EventKind::Remove);
        assert!(!ev.tag_present);
        assert_eq!(ev.tag_type.as_deref(), Some("NTAG215"));
        assert_eq!(ev.time_status, None);
    }

    #[test]
    fn test_validate_rejects_unknown_type() {
        let err = validate(&payload("tap_in", "2025-04-09T12:00:00Z")).unwrap_err();
        assert!(matches!(err, AppError::InvalidEventType(_)));
    }

    #[test]
    fn test_validate_rejects_blank_ids() {
        let mut p = payload("tag_insert", "2025-04-09T12:00:00Z");
        p.tag_id = "  ".into();
        assert!(matches!(validate(&p), Err(AppError::InvalidEvent(_))));
    }

    #[test]
    fn test_batch_drops_bad_records_individually() {
        let records = vec![
            json!({"timestamp": "2025-04-09T12:00:00Z", "event_type": "tag_insert",
                   "tag_present": true, "tag_id": "T1", "device_id": "reader-01"}),
            json!({"timestamp": "not a date", "event_type": "tag_insert",
                   "tag_present": true, "tag_id": "T1", "device_id": "reader-01"}),
            json!({"event_type": "tag_removed", "tag_present": false,
                   "tag_id": "T1", "device_id": "reader-01"}),
            json!({"timestamp": "2025-04-09T12:30:00Z", "event_type": "tag_removed",
                   "tag_present": false, "tag_id": "T1", "device_id": "reader-01"}),
        ];
        let report = validate_batch(&records, &[]);

        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(report.rejected[1].index, 2);
    }

    #[test]
    fn test_batch_rejects_unknown_device_when_directory_present() {
        let records = vec![
            json!({"timestamp": "2025-04-09T12:00:00Z", "event_type": "tag_insert",
                   "tag_present": true, "tag_id": "T1", "device_id": "reader-01"}),
            json!({"timestamp": "2025-04-09T12:00:00Z", "event_type": "tag_insert",
                   "tag_present": true, "tag_id": "T2", "device_id": "stranger"}),
        ];
        let devices = vec![DeviceAssignment::new("reader-01")];
        let report = validate_batch(&records, &devices);

        assert_eq!(report.accepted.len(), 1);
        assert!(report.rejected[0].reason.contains("stranger"));
    }

    #[test]
    fn test_parse_records_object_or_array() {
        assert_eq!(parse_records(r#"{"a": 1}"#).unwrap().len(), 1);
        assert_eq!(parse_records(r#"[{"a": 1}, {"b": 2}]"#).unwrap().len(), 2);
        assert!(parse_records("42").is_err());
        assert!(parse_records("{").is_err());
    }
}
