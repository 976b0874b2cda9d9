//! Event store queries.

use crate::errors::{AppError, AppResult};
use crate::models::event::{Event, NewEvent};
use crate::models::event_kind::EventKind;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

/// Fixed-width UTC text form so that lexical order equals time order.
pub fn ts_to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn ts_from_db(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

pub fn map_row(row: &Row) -> Result<Event> {
    let ts_str: String = row.get("timestamp")?;
    let timestamp = ts_from_db(&ts_str)
        .ok_or_else(|| conversion_error(0, AppError::InvalidTimestamp(ts_str.clone())))?;

    let kind_str: String = row.get("event_type")?;
    let kind = EventKind::from_wire(&kind_str)
        .ok_or_else(|| conversion_error(0, AppError::InvalidEventType(kind_str.clone())))?;

    Ok(Event {
        id: row.get("id")?,
        tag_id: row.get("tag_id")?,
        device_id: row.get("device_id")?,
        kind,
        timestamp,
        tag_present: row.get::<_, i32>("tag_present")? == 1,
    })
}

/// Insert an event and return the id assigned by SQLite.
pub fn insert_event(conn: &Connection, ev: &NewEvent) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO events (tag_id, device_id, event_type, timestamp, tag_present,
                             tag_type, wifi_status, time_status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            ev.tag_id,
            ev.device_id,
            ev.kind.as_wire(),
            ts_to_db(&ev.timestamp),
            if ev.tag_present { 1 } else { 0 },
            ev.tag_type,
            ev.wifi_status,
            ev.time_status,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a batch atomically. Returns the stored events with their ids.
pub fn insert_events(conn: &mut Connection, events: &[NewEvent]) -> AppResult<Vec<Event>> {
    let tx = conn.transaction()?;
    let mut stored = Vec::with_capacity(events.len());
    for ev in events {
        let id = insert_event(&tx, ev)?;
        stored.push(ev.clone().into_event(id));
    }
    tx.commit()?;
    Ok(stored)
}

fn collect(stmt: &mut rusqlite::Statement<'_>, params: impl rusqlite::Params) -> AppResult<Vec<Event>> {
    let rows = stmt.query_map(params, map_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Events with `from <= timestamp < to`, in delivery order for equal instants.
pub fn load_events_between(
    conn: &Connection,
    from: &DateTime<Utc>,
    to: &DateTime<Utc>,
) -> AppResult<Vec<Event>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM events
         WHERE timestamp >= ?1 AND timestamp < ?2
         ORDER BY timestamp ASC, id ASC",
    )?;
    collect(&mut stmt, params![ts_to_db(from), ts_to_db(to)])
}

pub fn load_events_for_tag(conn: &Connection, tag_id: &str) -> AppResult<Vec<Event>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM events
         WHERE tag_id = ?1
         ORDER BY timestamp ASC, id ASC",
    )?;
    collect(&mut stmt, params![tag_id])
}

/// Opening INSERT of every session still active at `before`: tags whose last
/// event strictly before that instant is an INSERT.
pub fn load_session_openers(conn: &Connection, before: &DateTime<Utc>) -> AppResult<Vec<Event>> {
    let before = ts_to_db(before);
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM events e
         WHERE e.timestamp < ?1
           AND e.event_type = ?2
           AND e.id = (SELECT l.id FROM events l
                       WHERE l.tag_id = e.tag_id AND l.timestamp < ?1
                       ORDER BY l.timestamp DESC, l.id DESC LIMIT 1)
         ORDER BY e.timestamp ASC, e.id ASC",
    )?;
    let last_inserts = collect(&mut stmt, params![before, EventKind::Insert.as_wire()])?;

    let mut openers = Vec::with_capacity(last_inserts.len());
    for last in last_inserts {
        let closed = last_remove_before(conn, &last.tag_id, &before)?;
        // duplicate INSERTs keep the first start
        let opener = first_insert_after(conn, &last.tag_id, closed.as_ref(), &before)?;
        openers.push(opener.unwrap_or(last));
    }
    Ok(openers)
}

fn last_remove_before(conn: &Connection, tag_id: &str, before: &str) -> AppResult<Option<Event>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM events
         WHERE tag_id = ?1 AND event_type = ?2 AND timestamp < ?3
         ORDER BY timestamp DESC, id DESC LIMIT 1",
    )?;
    let ev = stmt
        .query_row(
            params![tag_id, EventKind::Remove.as_wire(), before],
            map_row,
        )
        .optional()?;
    Ok(ev)
}

fn first_insert_after(
    conn: &Connection,
    tag_id: &str,
    after: Option<&Event>,
    before: &str,
) -> AppResult<Option<Event>> {
    let (after_ts, after_id) = match after {
        Some(ev) => (Some(ts_to_db(&ev.timestamp)), ev.id),
        None => (None, 0),
    };
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM events
         WHERE tag_id = ?1 AND event_type = ?2 AND timestamp < ?3
           AND (?4 IS NULL OR timestamp > ?4 OR (timestamp = ?4 AND id > ?5))
         ORDER BY timestamp ASC, id ASC LIMIT 1",
    )?;
    let ev = stmt
        .query_row(
            params![tag_id, EventKind::Insert.as_wire(), before, after_ts, after_id],
            map_row,
        )
        .optional()?;
    Ok(ev)
}

/// First REMOVE of `tag_id` at or after `from`.
pub fn first_remove_from(
    conn: &Connection,
    tag_id: &str,
    from: &DateTime<Utc>,
) -> AppResult<Option<Event>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM events
         WHERE tag_id = ?1 AND event_type = ?2 AND timestamp >= ?3
         ORDER BY timestamp ASC, id ASC LIMIT 1",
    )?;
    let ev = stmt
        .query_row(
            params![tag_id, EventKind::Remove.as_wire(), ts_to_db(from)],
            map_row,
        )
        .optional()?;
    Ok(ev)
}

pub fn count_events(conn: &Connection) -> AppResult<i64> {
    let n = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
    Ok(n)
}

pub fn load_all_events(conn: &Connection) -> AppResult<Vec<Event>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM events ORDER BY timestamp ASC, id ASC")?;
    collect(&mut stmt, [])
}
