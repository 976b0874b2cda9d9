use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ingest::{DevicePayload, validate_batch};
use crate::db::log::ttlog_quiet;
use crate::db::queries::insert_event;
use crate::db::source::DeviceDirectory;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::time::{format_local, parse_at};
use chrono::{SecondsFormat, Utc};

/// Handle the `event` command: one device event typed by hand.
///
/// The record goes through the same boundary checks as `ingest`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Event {
        tag,
        device,
        kind,
        at,
        present,
    } = cmd
    {
        let tz = cfg.tz()?;

        // 1️⃣ istante dell'evento (default: adesso)
        let timestamp = match at {
            Some(raw) => parse_at(raw, &tz)?,
            None => Utc::now(),
        };

        let payload = DevicePayload {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            event_type: kind.as_wire().to_string(),
            tag_present: present.unwrap_or_else(|| kind.implies_present()),
            tag_id: tag.clone(),
            device_id: device.clone(),
            tag_type: None,
            wifi_status: None,
            time_status: None,
        };

        // 2️⃣ validazione
        let pool = open_pool(cfg)?;
        let report = validate_batch(
            &[serde_json::to_value(&payload)?],
            &pool.device_assignments()?,
        );

        if let Some(rejected) = report.rejected.first() {
            return Err(AppError::InvalidEvent(rejected.reason.clone()));
        }

        // 3️⃣ salvataggio
        for ev in &report.accepted {
            let id = insert_event(&pool.conn, ev)?;
            success(format!(
                "Event #{} recorded: {} {} on {} at {}",
                id,
                ev.kind.label(),
                ev.tag_id,
                ev.device_id,
                format_local(&ev.timestamp, &tz, "%Y-%m-%d %H:%M:%S")
            ));
            ttlog_quiet(
                &pool.conn,
                "event",
                &ev.tag_id,
                &format!("{} from {}", ev.kind.as_wire(), ev.device_id),
            );
        }
    }

    Ok(())
}
