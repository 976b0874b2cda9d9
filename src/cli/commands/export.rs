use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog_quiet;
use crate::errors::AppResult;
use crate::export::{ExportLogic, ExportRequest};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        events,
        force,
    } = cmd
    {
        let tz = cfg.tz()?;
        let pool = open_pool(cfg)?;

        let req = ExportRequest {
            format: *format,
            file,
            range: range.as_deref(),
            events: *events,
            force: *force,
        };

        let rows = ExportLogic::export(&pool, &tz, cfg.lookback_hours, &req)?;
        if rows > 0 {
            ttlog_quiet(
                &pool.conn,
                "export",
                file,
                &format!(
                    "{} {} row(s) as {}",
                    rows,
                    if *events { "event" } else { "block" },
                    format.as_str()
                ),
            );
        }
    }
    Ok(())
}
