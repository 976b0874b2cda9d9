//! Event-to-time-block aggregation.
//!
//! Turns a stream of tag insert/remove events into closed time blocks plus
//! at most one open session per tag. The functions here are pure: same events,
//! same lookup, same timezone and `as_of` always give the same result.

use crate::models::event::Event;
use crate::models::event_kind::EventKind;
use crate::models::tag::TagLookup;
use crate::models::time_block::{OpenSession, TimeBlock};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

/// Sequencing noise seen while aggregating. Not errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnomalyCounts {
    /// INSERT received while the tag was already on the reader.
    pub duplicate_inserts: usize,
    /// REMOVE received while the tag was not on the reader.
    pub orphan_removes: usize,
}

impl AnomalyCounts {
    pub fn total(&self) -> usize {
        self.duplicate_inserts + self.orphan_removes
    }

    fn record(&mut self, kind: AnomalyKind) {
        match kind {
            AnomalyKind::DuplicateInsert => self.duplicate_inserts += 1,
            AnomalyKind::OrphanRemove => self.orphan_removes += 1,
        }
    }

    /// Counts for the given anomalies only.
    pub fn tally<'a, I>(anomalies: I) -> Self
    where
        I: IntoIterator<Item = &'a Anomaly>,
    {
        let mut counts = Self::default();
        for a in anomalies {
            counts.record(a.kind);
        }
        counts
    }

    fn merge(&mut self, other: AnomalyCounts) {
        self.duplicate_inserts += other.duplicate_inserts;
        self.orphan_removes += other.orphan_removes;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnomalyKind {
    DuplicateInsert,
    OrphanRemove,
}

/// One ignored event and where it sits in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub tag_id: String,
    pub event_id: i64,
    pub at: DateTime<Utc>,
}

/// Result of aggregating the events of a single tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagAggregation {
    pub tag_id: String,
    pub blocks: Vec<TimeBlock>,
    /// Trailing INSERT with no REMOVE. Still reported when `as_of` closed it
    /// into a block, so callers can show the tag as currently active.
    pub open: Option<OpenSession>,
    pub anomalies: AnomalyCounts,
    pub anomaly_events: Vec<Anomaly>,
}

/// Result of aggregating events of any number of tags.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    /// Ordered by `start_time`, then `tag_id`.
    pub blocks: Vec<TimeBlock>,
    /// One entry per tag still on a reader, ordered by start.
    pub open_sessions: Vec<OpenSession>,
    pub anomalies: AnomalyCounts,
    /// Ordered by instant.
    pub anomaly_events: Vec<Anomaly>,
}

impl Aggregation {
    pub fn total_minutes(&self) -> f64 {
        self.blocks.iter().map(|b| b.duration_minutes).sum()
    }
}

enum TagState<'a> {
    Idle,
    Active { start: &'a Event },
}

struct Labels {
    project_name: Option<String>,
    task_name: Option<String>,
}

impl Labels {
    fn resolve<L: TagLookup + ?Sized>(lookup: &L, tag_id: &str) -> Self {
        match lookup.assignment(tag_id) {
            Some(a) => Self {
                project_name: a.project_name.clone(),
                task_name: a.task_name.clone(),
            },
            None => Self {
                project_name: None,
                task_name: None,
            },
        }
    }
}

/// Calendar day of `instant` in the reference timezone.
pub fn activity_date(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Whole seconds between `start` and `end`, in minutes. Negative spans give 0.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let secs = (end - start).num_seconds().max(0);
    secs as f64 / 60.0
}

fn make_block(
    tag_id: &str,
    labels: &Labels,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: &Tz,
) -> TimeBlock {
    // a block never ends before it starts
    let end = end.max(start);
    TimeBlock {
        tag_id: tag_id.to_string(),
        project_name: labels.project_name.clone(),
        task_name: labels.task_name.clone(),
        start_time: start,
        end_time: end,
        duration_minutes: duration_minutes(start, end),
        activity_date: activity_date(start, tz),
    }
}

/// Aggregate the events of one tag.
///
/// Events whose `tag_id` differs from `tag_id` are ignored. The input does not
/// need to be sorted; events are stably sorted by timestamp, so events sharing
/// a timestamp keep their input order.
///
/// When `as_of` is given, a trailing open session is also closed into a block
/// ending at `as_of`.
pub fn aggregate_tag<L: TagLookup + ?Sized>(
    tag_id: &str,
    events: &[Event],
    lookup: &L,
    tz: &Tz,
    as_of: Option<DateTime<Utc>>,
) -> TagAggregation {
    let selected: Vec<&Event> = events.iter().filter(|e| e.tag_id == tag_id).collect();
    run_tag(tag_id, selected, lookup, tz, as_of)
}

fn run_tag<L: TagLookup + ?Sized>(
    tag_id: &str,
    mut events: Vec<&Event>,
    lookup: &L,
    tz: &Tz,
    as_of: Option<DateTime<Utc>>,
) -> TagAggregation {
    // stable: ties keep delivery order
    events.sort_by_key(|e| e.timestamp);

    let labels = Labels::resolve(lookup, tag_id);
    let mut state = TagState::Idle;
    let mut blocks = Vec::new();
    let mut anomaly_events = Vec::new();
    let mut flag = |kind: AnomalyKind, ev: &Event| {
        anomaly_events.push(Anomaly {
            kind,
            tag_id: tag_id.to_string(),
            event_id: ev.id,
            at: ev.timestamp,
        });
    };

    for ev in events {
        state = match (state, ev.kind) {
            (TagState::Idle, EventKind::Insert) => TagState::Active { start: ev },
            (TagState::Active { start }, EventKind::Insert) => {
                tracing::debug!(
                    tag_id,
                    event_id = ev.id,
                    start = %start.timestamp,
                    "duplicate insert ignored, keeping original start"
                );
                flag(AnomalyKind::DuplicateInsert, ev);
                TagState::Active { start }
            }
            (TagState::Active { start }, EventKind::Remove) => {
                blocks.push(make_block(
                    tag_id,
                    &labels,
                    start.timestamp,
                    ev.timestamp,
                    tz,
                ));
                TagState::Idle
            }
            (TagState::Idle, EventKind::Remove) => {
                tracing::debug!(tag_id, event_id = ev.id, "orphan remove ignored");
                flag(AnomalyKind::OrphanRemove, ev);
                TagState::Idle
            }
        };
    }

    let open = match state {
        TagState::Idle => None,
        TagState::Active { start } => {
            if let Some(now) = as_of {
                blocks.push(make_block(tag_id, &labels, start.timestamp, now, tz));
            }
            Some(OpenSession {
                tag_id: tag_id.to_string(),
                device_id: start.device_id.clone(),
                project_name: labels.project_name.clone(),
                task_name: labels.task_name.clone(),
                start_time: start.timestamp,
                activity_date: activity_date(start.timestamp, tz),
            })
        }
    };

    TagAggregation {
        tag_id: tag_id.to_string(),
        blocks,
        open,
        anomalies: AnomalyCounts::tally(&anomaly_events),
        anomaly_events,
    }
}

/// Aggregate events of any number of tags: one state machine per distinct
/// `tag_id`, results merged and ordered by start time.
pub fn aggregate<L: TagLookup + ?Sized>(
    events: &[Event],
    lookup: &L,
    tz: &Tz,
    as_of: Option<DateTime<Utc>>,
) -> Aggregation {
    let mut by_tag: BTreeMap<&str, Vec<&Event>> = BTreeMap::new();
    for ev in events {
        by_tag.entry(ev.tag_id.as_str()).or_default().push(ev);
    }

    let mut out = Aggregation::default();
    for (tag_id, tag_events) in by_tag {
        let agg = run_tag(tag_id, tag_events, lookup, tz, as_of);
        out.blocks.extend(agg.blocks);
        out.open_sessions.extend(agg.open);
        out.anomalies.merge(agg.anomalies);
        out.anomaly_events.extend(agg.anomaly_events);
    }

    out.anomaly_events
        .sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.event_id.cmp(&b.event_id)));

    out.blocks.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.tag_id.cmp(&b.tag_id))
    });
    out.open_sessions.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.tag_id.cmp(&b.tag_id))
    });

    if out.anomalies.total() > 0 {
        tracing::info!(
            duplicate_inserts = out.anomalies.duplicate_inserts,
            orphan_removes = out.anomalies.orphan_removes,
            "event stream contained sequencing anomalies"
        );
    }

    out
}
