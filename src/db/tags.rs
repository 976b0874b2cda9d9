//! Tag assignment directory.

use crate::db::queries::{ts_from_db, ts_to_db};
use crate::errors::{AppError, AppResult};
use crate::models::tag::TagAssignment;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn map_tag(row: &Row) -> Result<TagAssignment> {
    let assigned_raw: String = row.get("assigned_at")?;
    Ok(TagAssignment {
        tag_id: row.get("tag_id")?,
        project_name: row.get("project_name")?,
        task_name: row.get("task_name")?,
        is_reflection_trigger: row.get::<_, i32>("is_reflection_trigger")? == 1,
        // rows written by hand may carry anything here
        assigned_at: ts_from_db(&assigned_raw).unwrap_or_else(Utc::now),
    })
}

/// Insert or replace the assignment for `tag.tag_id`.
pub fn upsert_tag(conn: &Connection, tag: &TagAssignment) -> AppResult<()> {
    conn.execute(
        "INSERT INTO tag_assignments (tag_id, project_name, task_name, is_reflection_trigger, assigned_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(tag_id) DO UPDATE SET
             project_name = excluded.project_name,
             task_name = excluded.task_name,
             is_reflection_trigger = excluded.is_reflection_trigger,
             assigned_at = excluded.assigned_at",
        params![
            tag.tag_id,
            tag.project_name,
            tag.task_name,
            if tag.is_reflection_trigger { 1 } else { 0 },
            ts_to_db(&tag.assigned_at),
        ],
    )?;
    Ok(())
}

pub fn load_tag(conn: &Connection, tag_id: &str) -> AppResult<Option<TagAssignment>> {
    let tag = conn
        .query_row(
            "SELECT * FROM tag_assignments WHERE tag_id = ?1",
            [tag_id],
            map_tag,
        )
        .optional()?;
    Ok(tag)
}

/// All assignments, most recently assigned first.
pub fn load_tags(conn: &Connection) -> AppResult<Vec<TagAssignment>> {
    let mut stmt =
        conn.prepare_cached("SELECT * FROM tag_assignments ORDER BY assigned_at DESC, tag_id ASC")?;
    let rows = stmt.query_map([], map_tag)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_tag(conn: &Connection, tag_id: &str) -> AppResult<()> {
    let n = conn.execute("DELETE FROM tag_assignments WHERE tag_id = ?1", [tag_id])?;
    if n == 0 {
        return Err(AppError::TagNotFound(tag_id.to_string()));
    }
    Ok(())
}
