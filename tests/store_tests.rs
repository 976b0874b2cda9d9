use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use rtagtracker::core::logic::{BlockQuery, Core};
use rtagtracker::db::devices::upsert_device;
use rtagtracker::db::initialize::init_db;
use rtagtracker::db::pool::DbPool;
use rtagtracker::db::queries::{count_events, insert_events, load_events_between};
use rtagtracker::db::source::{DeviceDirectory, EventSource, TagDirectory};
use rtagtracker::db::tags::upsert_tag;
use rtagtracker::errors::{AppError, AppResult};
use rtagtracker::models::dashboard::DashboardMetrics;
use rtagtracker::models::device::DeviceAssignment;
use rtagtracker::models::event::{Event, NewEvent};
use rtagtracker::models::event_kind::EventKind;
use rtagtracker::models::tag::TagAssignment;

fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, d, h, m, 0).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn pool() -> DbPool {
    let pool = DbPool::in_memory().expect("in-memory db");
    init_db(&pool.conn).expect("migrations");
    pool
}

fn ev(tag: &str, kind: EventKind, ts: DateTime<Utc>) -> NewEvent {
    NewEvent::new(tag, "reader-01", kind, ts)
}

#[test]
fn test_insert_and_load_in_time_order() {
    let mut pool = pool();
    let stored = insert_events(
        &mut pool.conn,
        &[
            ev("T1", EventKind::Remove, at(10, 9, 45)),
            ev("T1", EventKind::Insert, at(10, 9, 0)),
        ],
    )
    .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored[0].id < stored[1].id);

    let loaded = load_events_between(&pool.conn, &at(10, 0, 0), &at(11, 0, 0)).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].kind, EventKind::Insert);
    assert_eq!(loaded[0].timestamp, at(10, 9, 0));
    assert!(!loaded[1].tag_present);

    // upper bound is exclusive
    let none = load_events_between(&pool.conn, &at(10, 0, 0), &at(10, 9, 0)).unwrap();
    assert!(none.is_empty());
    assert_eq!(count_events(&pool.conn).unwrap(), 2);
}

#[test]
fn test_block_report_uses_current_labels() {
    let mut pool = pool();
    upsert_tag(&pool.conn, &TagAssignment::new("T1", Some("Work"), Some("Email"))).unwrap();
    insert_events(
        &mut pool.conn,
        &[
            ev("T1", EventKind::Insert, at(10, 9, 0)),
            ev("T1", EventKind::Remove, at(10, 9, 45)),
            ev("T1", EventKind::Insert, at(10, 10, 0)),
            ev("T1", EventKind::Remove, at(10, 10, 30)),
        ],
    )
    .unwrap();

    // relabel after the fact: reports follow the current assignment
    upsert_tag(&pool.conn, &TagAssignment::new("T1", Some("Home"), None)).unwrap();

    let tz = Tz::UTC;
    let report = Core::build_block_report(
        &pool,
        &BlockQuery {
            from: day(10),
            to: day(10),
            tz: &tz,
            lookback_hours: 24,
            as_of: None,
            tag: None,
        },
    )
    .unwrap();

    assert_eq!(report.blocks.len(), 2);
    assert_eq!(report.blocks[0].duration_minutes, 45.0);
    assert_eq!(report.blocks[1].duration_minutes, 30.0);
    assert!(
        report
            .blocks
            .iter()
            .all(|b| b.project_name.as_deref() == Some("Home") && b.task_name.is_none())
    );
    assert!(report.open_sessions.is_empty());
}

#[test]
fn test_lookback_closes_session_started_before_window() {
    let mut pool = pool();
    insert_events(
        &mut pool.conn,
        &[
            ev("T1", EventKind::Insert, at(10, 23, 50)),
            ev("T1", EventKind::Remove, at(11, 0, 20)),
            ev("T2", EventKind::Insert, at(10, 22, 0)),
            ev("T2", EventKind::Remove, at(11, 1, 0)),
        ],
    )
    .unwrap();

    let tz = Tz::UTC;
    let query = |from: u32, to: u32, lookback_hours: u32| BlockQuery {
        from: day(from),
        to: day(to),
        tz: &tz,
        lookback_hours,
        as_of: None,
        tag: None,
    };

    // both blocks start on the 10th: nothing on the 11th, no orphan leakage
    let report = Core::build_block_report(&pool, &query(11, 11, 24)).unwrap();
    assert!(report.blocks.is_empty());
    assert!(report.open_sessions.is_empty());
    assert_eq!(report.anomalies.total(), 0);

    let report = Core::build_block_report(&pool, &query(10, 10, 24)).unwrap();
    assert_eq!(report.blocks.len(), 2);
    assert_eq!(report.blocks[0].tag_id, "T2");
    assert_eq!(report.blocks[0].duration_minutes, 180.0);
    assert_eq!(report.blocks[1].duration_minutes, 30.0);
}

#[test]
fn test_session_closed_after_lookback_is_a_block() {
    let mut pool = pool();
    insert_events(
        &mut pool.conn,
        &[
            ev("T1", EventKind::Insert, at(10, 9, 0)),
            ev("T1", EventKind::Remove, at(12, 10, 0)),
        ],
    )
    .unwrap();

    let tz = Tz::UTC;
    let query = |from: u32, to: u32, as_of: Option<DateTime<Utc>>| BlockQuery {
        from: day(from),
        to: day(to),
        tz: &tz,
        lookback_hours: 24,
        as_of,
        tag: None,
    };

    // the REMOVE is past the fetched range of the 10th
    let report = Core::build_block_report(&pool, &query(10, 10, None)).unwrap();
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.blocks[0].end_time, at(12, 10, 0));
    assert_eq!(report.blocks[0].duration_minutes, 2940.0);
    assert!(report.open_sessions.is_empty());

    // a later "now" does not stretch a session that was already closed
    let june = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let report = Core::build_block_report(&pool, &query(10, 10, Some(june))).unwrap();
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.blocks[0].duration_minutes, 2940.0);
    assert!(report.open_sessions.is_empty());

    let report = Core::build_block_report(&pool, &query(10, 12, None)).unwrap();
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.blocks[0].duration_minutes, 2940.0);

    // seen from the 12th, the REMOVE closes a session opened before the range
    let report = Core::build_block_report(&pool, &query(12, 12, None)).unwrap();
    assert!(report.blocks.is_empty());
    assert!(report.open_sessions.is_empty());
    assert_eq!(report.anomalies.total(), 0);
}

#[test]
fn test_long_open_session_keeps_original_start() {
    let mut pool = pool();
    insert_events(
        &mut pool.conn,
        &[
            ev("T1", EventKind::Insert, at(1, 8, 0)),
            ev("T1", EventKind::Insert, at(2, 9, 0)),
            ev("T2", EventKind::Insert, at(3, 8, 0)),
            ev("T2", EventKind::Remove, at(3, 9, 0)),
        ],
    )
    .unwrap();

    let openers = pool.session_openers(at(9, 0, 0)).unwrap();
    assert_eq!(openers.len(), 1);
    assert_eq!(openers[0].timestamp, at(1, 8, 0));
    assert!(pool.next_remove("T1", at(1, 0, 0)).unwrap().is_none());
    assert_eq!(
        pool.next_remove("T2", at(1, 0, 0)).unwrap().map(|e| e.timestamp),
        Some(at(3, 9, 0))
    );

    let tz = Tz::UTC;
    let report = Core::build_block_report(
        &pool,
        &BlockQuery {
            from: day(10),
            to: day(10),
            tz: &tz,
            lookback_hours: 24,
            as_of: None,
            tag: None,
        },
    )
    .unwrap();

    assert!(report.blocks.is_empty());
    assert_eq!(report.open_sessions.len(), 1);
    assert_eq!(report.open_sessions[0].tag_id, "T1");
    assert_eq!(report.open_sessions[0].start_time, at(1, 8, 0));
    assert_eq!(report.anomalies.total(), 0);
}

#[test]
fn test_anomalies_only_counted_inside_window() {
    let mut pool = pool();
    insert_events(
        &mut pool.conn,
        &[
            // pair straddling the start of the fetched range
            ev("T1", EventKind::Insert, at(8, 18, 0)),
            ev("T1", EventKind::Remove, at(9, 4, 0)),
            ev("T1", EventKind::Remove, at(9, 6, 0)),
            ev("T1", EventKind::Remove, at(10, 12, 0)),
        ],
    )
    .unwrap();

    let tz = Tz::UTC;
    let report = Core::build_block_report(
        &pool,
        &BlockQuery {
            from: day(10),
            to: day(10),
            tz: &tz,
            lookback_hours: 24,
            as_of: None,
            tag: None,
        },
    )
    .unwrap();

    assert!(report.blocks.is_empty());
    assert_eq!(report.anomalies.orphan_removes, 1);
    assert_eq!(report.anomalies.duplicate_inserts, 0);
}

#[test]
fn test_rome_day_bucketing() {
    let mut pool = pool();
    // 23:30 UTC on the 9th is 00:30 on the 10th in Rome (CET, UTC+1)
    insert_events(
        &mut pool.conn,
        &[
            ev("T1", EventKind::Insert, at(9, 23, 30)),
            ev("T1", EventKind::Remove, at(10, 0, 15)),
        ],
    )
    .unwrap();

    let rome: Tz = "Europe/Rome".parse().unwrap();
    let report = Core::build_block_report(
        &pool,
        &BlockQuery {
            from: day(10),
            to: day(10),
            tz: &rome,
            lookback_hours: 24,
            as_of: None,
            tag: None,
        },
    )
    .unwrap();

    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.blocks[0].activity_date, day(10));
    assert_eq!(report.blocks[0].duration_minutes, 45.0);
}

#[test]
fn test_as_of_closes_open_session() {
    let mut pool = pool();
    insert_events(&mut pool.conn, &[ev("T1", EventKind::Insert, at(10, 9, 0))]).unwrap();

    let tz = Tz::UTC;
    let mut q = BlockQuery {
        from: day(10),
        to: day(10),
        tz: &tz,
        lookback_hours: 24,
        as_of: None,
        tag: None,
    };

    let open = Core::build_block_report(&pool, &q).unwrap();
    assert!(open.blocks.is_empty());
    assert_eq!(open.open_sessions.len(), 1);
    assert_eq!(open.open_sessions[0].start_time, at(10, 9, 0));

    q.as_of = Some(at(10, 11, 0));
    let closed = Core::build_block_report(&pool, &q).unwrap();
    assert_eq!(closed.blocks.len(), 1);
    assert_eq!(closed.blocks[0].duration_minutes, 120.0);
    assert_eq!(closed.open_sessions.len(), 1);
}

#[test]
fn test_dashboard_from_store() {
    let mut pool = pool();
    upsert_tag(&pool.conn, &TagAssignment::new("T1", Some("Work"), Some("Email"))).unwrap();
    upsert_tag(&pool.conn, &TagAssignment::new("T2", Some("Home"), None)).unwrap();
    upsert_device(&pool.conn, &DeviceAssignment::new("reader-01")).unwrap();
    insert_events(
        &mut pool.conn,
        &[
            ev("T1", EventKind::Insert, at(10, 9, 0)),
            ev("T1", EventKind::Remove, at(10, 9, 45)),
            ev("T2", EventKind::Insert, at(8, 18, 0)),
            ev("T2", EventKind::Remove, at(8, 19, 0)),
            // outside a 7-day window ending on the 10th
            ev("T1", EventKind::Insert, at(1, 9, 0)),
            ev("T1", EventKind::Remove, at(1, 10, 0)),
        ],
    )
    .unwrap();

    let m = Core::build_dashboard(&pool, &Tz::UTC, day(10), 7, 24).unwrap();
    assert_eq!(m.active_projects, 2);
    assert_eq!(m.completed_tasks, 1);
    assert_eq!(m.total_tags, 2);
    assert_eq!(m.total_devices, 1);
    assert_eq!(m.today_time_minutes, 45.0);
    assert_eq!(m.week_time_minutes, 105.0);
}

struct Unreachable;

impl EventSource for Unreachable {
    fn events_between(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> AppResult<Vec<Event>> {
        Err(AppError::Fetch {
            what: "events",
            reason: "connection refused".into(),
        })
    }

    fn events_for_tag(&self, _: &str) -> AppResult<Vec<Event>> {
        Ok(Vec::new())
    }

    fn session_openers(&self, _: DateTime<Utc>) -> AppResult<Vec<Event>> {
        Ok(Vec::new())
    }

    fn next_remove(&self, _: &str, _: DateTime<Utc>) -> AppResult<Option<Event>> {
        Ok(None)
    }
}

impl TagDirectory for Unreachable {
    fn tag_assignments(&self) -> AppResult<Vec<TagAssignment>> {
        Ok(Vec::new())
    }
}

impl DeviceDirectory for Unreachable {
    fn device_assignments(&self) -> AppResult<Vec<DeviceAssignment>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_fetch_failure_is_distinct_from_empty() {
    let err = Core::build_dashboard(&Unreachable, &Tz::UTC, day(10), 7, 24).unwrap_err();
    assert!(matches!(err, AppError::Fetch { what: "events", .. }));

    let empty = Core::build_dashboard(&pool(), &Tz::UTC, day(10), 7, 24).unwrap();
    assert_eq!(empty, DashboardMetrics::default());
}

#[test]
fn test_directories_through_fetch_traits() {
    let mut pool = pool();
    upsert_tag(&pool.conn, &TagAssignment::new("T1", Some("Work"), None)).unwrap();
    upsert_device(&pool.conn, &DeviceAssignment::new("reader-01")).unwrap();
    insert_events(
        &mut pool.conn,
        &[
            ev("T1", EventKind::Insert, at(10, 9, 0)),
            ev("T2", EventKind::Insert, at(10, 9, 5)),
            ev("T1", EventKind::Remove, at(10, 9, 30)),
        ],
    )
    .unwrap();

    let t1 = pool.events_for_tag("T1").unwrap();
    assert_eq!(t1.len(), 2);
    assert!(t1.iter().all(|e| e.tag_id == "T1"));

    assert_eq!(pool.tag_assignments().unwrap().len(), 1);
    assert_eq!(pool.device_assignments().unwrap()[0].device_id, "reader-01");
}
