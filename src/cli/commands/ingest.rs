use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ingest::{parse_records, validate_batch};
use crate::db::log::ttlog_quiet;
use crate::db::queries::insert_events;
use crate::db::source::DeviceDirectory;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use std::fs;

/// Handle the `ingest` command.
///
/// Bad records are reported and skipped; valid ones are stored in one
/// transaction.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Ingest { file } = cmd {
        let content = fs::read_to_string(file)?;
        let records = parse_records(&content)?;

        let mut pool = open_pool(cfg)?;
        let devices = pool.device_assignments()?;
        let report = validate_batch(&records, &devices);

        for r in &report.rejected {
            warning(format!("Record #{} rejected: {}", r.index, r.reason));
        }

        if report.accepted.is_empty() {
            info(format!(
                "No valid events in {} ({} rejected).",
                file,
                report.rejected.len()
            ));
            return Ok(());
        }

        let stored = insert_events(&mut pool.conn, &report.accepted)?;

        success(format!(
            "Ingested {} event(s), rejected {}.",
            stored.len(),
            report.rejected.len()
        ));
        ttlog_quiet(
            &pool.conn,
            "ingest",
            file,
            &format!(
                "accepted={} rejected={}",
                stored.len(),
                report.rejected.len()
            ),
        );
    }

    Ok(())
}
