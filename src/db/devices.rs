//! Device directory.

use crate::db::queries::{ts_from_db, ts_to_db};
use crate::errors::{AppError, AppResult};
use crate::models::device::DeviceAssignment;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn map_device(row: &Row) -> Result<DeviceAssignment> {
    let assigned_raw: String = row.get("assigned_at")?;
    Ok(DeviceAssignment {
        device_id: row.get("device_id")?,
        device_name: row.get("device_name")?,
        location: row.get("location")?,
        notes: row.get("notes")?,
        assigned_at: ts_from_db(&assigned_raw).unwrap_or_else(Utc::now),
    })
}

pub fn upsert_device(conn: &Connection, dev: &DeviceAssignment) -> AppResult<()> {
    conn.execute(
        "INSERT INTO device_assignments (device_id, device_name, location, notes, assigned_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(device_id) DO UPDATE SET
             device_name = excluded.device_name,
             location = excluded.location,
             notes = excluded.notes,
             assigned_at = excluded.assigned_at",
        params![
            dev.device_id,
            dev.device_name,
            dev.location,
            dev.notes,
            ts_to_db(&dev.assigned_at),
        ],
    )?;
    Ok(())
}

pub fn load_device(conn: &Connection, device_id: &str) -> AppResult<Option<DeviceAssignment>> {
    let dev = conn
        .query_row(
            "SELECT * FROM device_assignments WHERE device_id = ?1",
            [device_id],
            map_device,
        )
        .optional()?;
    Ok(dev)
}

pub fn load_devices(conn: &Connection) -> AppResult<Vec<DeviceAssignment>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM device_assignments ORDER BY assigned_at DESC, device_id ASC",
    )?;
    let rows = stmt.query_map([], map_device)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_device(conn: &Connection, device_id: &str) -> AppResult<()> {
    let n = conn.execute(
        "DELETE FROM device_assignments WHERE device_id = ?1",
        [device_id],
    )?;
    if n == 0 {
        return Err(AppError::DeviceNotFound(device_id.to_string()));
    }
    Ok(())
}
