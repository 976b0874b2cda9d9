//! Fetch-then-aggregate orchestration used by the CLI.
//!
//! Everything time-dependent (`now`, `today`, timezone) is passed in by the
//! caller; nothing here reads the clock.

use crate::core::calculator::blocks::{self, AnomalyCounts};
use crate::core::calculator::metrics;
use crate::db::source::{DeviceDirectory, EventSource, TagDirectory};
use crate::errors::AppResult;
use crate::models::dashboard::DashboardMetrics;
use crate::models::tag::index_by_tag;
use crate::models::time_block::{OpenSession, TimeBlock};
use crate::utils::date::{days_to_utc, last_days};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Parameters of a block query over local days `from..=to`.
#[derive(Debug, Clone)]
pub struct BlockQuery<'a> {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub tz: &'a Tz,
    /// Hours of events fetched on each side of the window.
    pub lookback_hours: u32,
    /// Close open sessions at this instant.
    pub as_of: Option<DateTime<Utc>>,
    pub tag: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct BlockReport {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub blocks: Vec<TimeBlock>,
    pub open_sessions: Vec<OpenSession>,
    /// Anomalies whose event falls inside the window.
    pub anomalies: AnomalyCounts,
}

impl BlockReport {
    /// Blocks attributed to `date`.
    pub fn blocks_on(&self, date: NaiveDate) -> Vec<&TimeBlock> {
        self.blocks
            .iter()
            .filter(|b| b.activity_date == date)
            .collect()
    }

    /// Distinct days with at least one block, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = self.blocks.iter().map(|b| b.activity_date).collect();
        days.dedup();
        days
    }
}

pub struct Core;

impl Core {
    /// Load events around the window, aggregate, keep blocks whose
    /// `activity_date` falls inside it.
    ///
    /// The fetched range is widened per tag where needed: a session already
    /// active when the range starts gets its opening INSERT, and a session
    /// still open when it ends gets its closing REMOVE, however far away.
    pub fn build_block_report<S>(store: &S, q: &BlockQuery<'_>) -> AppResult<BlockReport>
    where
        S: EventSource + TagDirectory + ?Sized,
    {
        let (start, end) = days_to_utc(q.from, q.to, q.tz);
        let margin = Duration::hours(i64::from(q.lookback_hours));
        let (fetch_start, fetch_end) = (start - margin, end + margin);

        let mut events = store.session_openers(fetch_start)?;
        events.extend(store.events_between(fetch_start, fetch_end)?);
        if let Some(tag) = q.tag {
            events.retain(|e| e.tag_id == tag);
        }
        let tags = index_by_tag(&store.tag_assignments()?);

        let still_open = blocks::aggregate(&events, &tags, q.tz, None).open_sessions;
        for open in &still_open {
            if let Some(remove) = store.next_remove(&open.tag_id, fetch_end)? {
                tracing::debug!(
                    tag_id = %open.tag_id,
                    closed_at = %remove.timestamp,
                    "session closed after the fetched range"
                );
                events.push(remove);
            }
        }

        let agg = blocks::aggregate(&events, &tags, q.tz, q.as_of);

        let in_window = |d: NaiveDate| d >= q.from && d <= q.to;
        Ok(BlockReport {
            from: Some(q.from),
            to: Some(q.to),
            blocks: agg
                .blocks
                .into_iter()
                .filter(|b| in_window(b.activity_date))
                .collect(),
            open_sessions: agg
                .open_sessions
                .into_iter()
                .filter(|s| s.start_time < end)
                .collect(),
            anomalies: AnomalyCounts::tally(
                agg.anomaly_events
                    .iter()
                    .filter(|a| a.at >= start && a.at < end),
            ),
        })
    }

    /// Dashboard metrics for the `window_days` days ending on `today`.
    /// Only closed blocks count; open sessions are not closed at "now".
    pub fn build_dashboard<S>(
        store: &S,
        tz: &Tz,
        today: NaiveDate,
        window_days: u32,
        lookback_hours: u32,
    ) -> AppResult<DashboardMetrics>
    where
        S: EventSource + TagDirectory + DeviceDirectory + ?Sized,
    {
        let (from, to) = last_days(today, window_days);
        let report = Self::build_block_report(
            store,
            &BlockQuery {
                from,
                to,
                tz,
                lookback_hours,
                as_of: None,
                tag: None,
            },
        )?;

        let tags = store.tag_assignments()?;
        let devices = store.device_assignments()?;

        Ok(metrics::summarize(
            &report.blocks,
            &tags,
            &devices,
            today,
            window_days,
        ))
    }
}
