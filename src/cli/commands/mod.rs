pub mod blocks;
pub mod config;
pub mod device;
pub mod event;
pub mod events;
pub mod export;
pub mod ingest;
pub mod init;
pub mod log;
pub mod summary;
pub mod tag;

use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::date::{last_days, parse_period};
use chrono::NaiveDate;

/// Open the configured database, bringing its schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

/// Resolve the local days shown by listing commands.
///
/// Priority: `--today`, then `--period`, then `--days`, then `default_days`.
pub(crate) fn resolve_days(
    today: NaiveDate,
    only_today: bool,
    period: Option<&str>,
    days: Option<u32>,
    cfg: &Config,
) -> AppResult<(NaiveDate, NaiveDate)> {
    if only_today {
        return Ok((today, today));
    }
    if let Some(p) = period {
        return parse_period(p);
    }
    Ok(last_days(today, days.unwrap_or(cfg.default_days).max(1)))
}
