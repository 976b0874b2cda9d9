use serde::Serialize;

/// Dashboard-level aggregates derived from time blocks and directory counts.
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct DashboardMetrics {
    pub active_projects: usize,
    pub total_tags: usize,
    pub total_devices: usize,
    pub today_time_minutes: f64,
    pub week_time_minutes: f64,
    pub completed_tasks: usize,
}
