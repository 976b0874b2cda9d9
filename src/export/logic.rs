// src/export/logic.rs

use crate::core::calculator::blocks;
use crate::core::logic::{BlockQuery, Core};
use crate::db::pool::DbPool;
use crate::db::queries::{load_all_events, load_events_between};
use crate::db::source::TagDirectory;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::{BlockExport, EventExport};
use crate::models::tag::index_by_tag;
use crate::models::time_block::TimeBlock;
use crate::ui::messages::warning;
use crate::utils::date::{days_to_utc, parse_period};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::io;
use std::path::Path;

/// What to export and where.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub format: ExportFormat,
    /// Absolute path of the output file.
    pub file: &'a str,
    /// `None`, `"all"` or a period (`YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `START:END`).
    pub range: Option<&'a str>,
    /// Raw events instead of time blocks.
    pub events: bool,
    pub force: bool,
}

/// Logica di alto livello per l'export.
pub struct ExportLogic;

impl ExportLogic {
    /// Returns the number of exported rows. Zero rows means nothing was written.
    pub fn export(
        pool: &DbPool,
        tz: &Tz,
        lookback_hours: u32,
        req: &ExportRequest<'_>,
    ) -> AppResult<usize> {
        let path = Path::new(req.file);

        if !path.is_absolute() {
            return Err(AppError::from(io::Error::other(format!(
                "Output file path must be absolute: {}",
                req.file
            ))));
        }

        let bounds: Option<(NaiveDate, NaiveDate)> = match req.range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_period(r)?),
        };

        if req.events {
            let rows: Vec<EventExport> = load_events(pool, tz, bounds)?
                .iter()
                .map(|e| EventExport::from_event(e, tz))
                .collect();
            write_rows(&rows, path, req)
        } else {
            let rows: Vec<BlockExport> = load_blocks(pool, tz, lookback_hours, bounds)?
                .iter()
                .map(|b| BlockExport::from_block(b, tz))
                .collect();
            write_rows(&rows, path, req)
        }
    }
}

fn write_rows<T: Serialize>(rows: &[T], path: &Path, req: &ExportRequest<'_>) -> AppResult<usize> {
    if rows.is_empty() {
        warning("⚠️  No data found for selected range.");
        return Ok(0);
    }

    ensure_writable(path, req.force)?;

    match req.format {
        ExportFormat::Csv => export_csv(rows, path)?,
        ExportFormat::Json => export_json(rows, path)?,
    }

    Ok(rows.len())
}

fn load_events(
    pool: &DbPool,
    tz: &Tz,
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> AppResult<Vec<crate::models::event::Event>> {
    match bounds {
        None => load_all_events(&pool.conn),
        Some((from, to)) => {
            let (start, end) = days_to_utc(from, to, tz);
            load_events_between(&pool.conn, &start, &end)
        }
    }
}

/// Without bounds the whole history is aggregated in one pass.
fn load_blocks(
    pool: &DbPool,
    tz: &Tz,
    lookback_hours: u32,
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> AppResult<Vec<TimeBlock>> {
    match bounds {
        None => {
            let events = load_all_events(&pool.conn)?;
            let tags = index_by_tag(&pool.tag_assignments()?);
            Ok(blocks::aggregate(&events, &tags, tz, None).blocks)
        }
        Some((from, to)) => {
            let report = Core::build_block_report(
                pool,
                &BlockQuery {
                    from,
                    to,
                    tz,
                    lookback_hours,
                    as_of: None,
                    tag: None,
                },
            )?;
            Ok(report.blocks)
        }
    }
}
