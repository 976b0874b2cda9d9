use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered reader device.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeviceAssignment {
    pub device_id: String,
    pub device_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub assigned_at: DateTime<Utc>,
}

impl DeviceAssignment {
    pub fn new(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            device_name: None,
            location: None,
            notes: None,
            assigned_at: Utc::now(),
        }
    }
}
