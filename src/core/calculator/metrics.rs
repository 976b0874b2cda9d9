//! Dashboard metrics: order-insensitive folds over closed time blocks.

use crate::models::dashboard::DashboardMetrics;
use crate::models::device::DeviceAssignment;
use crate::models::tag::TagAssignment;
use crate::models::time_block::TimeBlock;
use crate::utils::date;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Which blocks a sum should include, by `activity_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    All,
    On(NaiveDate),
    /// Inclusive on both ends.
    Between(NaiveDate, NaiveDate),
}

impl DateFilter {
    /// The last `days` days ending with `today` (at least one day).
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let (from, to) = date::last_days(today, days);
        DateFilter::Between(from, to)
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        match *self {
            DateFilter::All => true,
            DateFilter::On(d) => date == d,
            DateFilter::Between(from, to) => date >= from && date <= to,
        }
    }
}

/// Distinct non-null project names.
pub fn active_projects(blocks: &[TimeBlock]) -> usize {
    blocks
        .iter()
        .filter(|b| b.is_labeled())
        .filter_map(|b| b.project_name.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

/// Sum of durations for blocks matching `filter`. Zero-minute blocks add 0.
pub fn total_minutes(blocks: &[TimeBlock], filter: DateFilter) -> f64 {
    blocks
        .iter()
        .filter(|b| filter.matches(b.activity_date))
        .map(|b| b.duration_minutes)
        .sum()
}

/// Distinct (project, task) pairs, both set, with at least one non-empty block.
pub fn completed_tasks(blocks: &[TimeBlock]) -> usize {
    blocks
        .iter()
        .filter(|b| !b.is_zero_duration())
        .filter_map(|b| match (&b.project_name, &b.task_name) {
            (Some(p), Some(t)) => Some((p.as_str(), t.as_str())),
            _ => None,
        })
        .collect::<HashSet<_>>()
        .len()
}

pub fn total_tags(tags: &[TagAssignment]) -> usize {
    tags.iter().filter(|t| !t.tag_id.trim().is_empty()).count()
}

pub fn total_devices(devices: &[DeviceAssignment]) -> usize {
    devices
        .iter()
        .filter(|d| !d.device_id.trim().is_empty())
        .count()
}

/// Build the dashboard record for a window of `window_days` days ending on
/// `today`. Blocks outside the window are ignored.
pub fn summarize(
    blocks: &[TimeBlock],
    tags: &[TagAssignment],
    devices: &[DeviceAssignment],
    today: NaiveDate,
    window_days: u32,
) -> DashboardMetrics {
    let window = DateFilter::last_days(today, window_days);
    let in_window: Vec<TimeBlock> = blocks
        .iter()
        .filter(|b| window.matches(b.activity_date))
        .cloned()
        .collect();

    DashboardMetrics {
        active_projects: active_projects(&in_window),
        total_tags: total_tags(tags),
        total_devices: total_devices(devices),
        today_time_minutes: total_minutes(&in_window, DateFilter::On(today)),
        week_time_minutes: total_minutes(&in_window, DateFilter::All),
        completed_tasks: completed_tasks(&in_window),
    }
}
