use crate::cli::commands::open_pool;
use crate::cli::parser::{Commands, DeviceAction};
use crate::config::Config;
use crate::db::devices::{delete_device, load_device, load_devices, upsert_device};
use crate::db::log::ttlog_quiet;
use crate::errors::{AppError, AppResult};
use crate::models::device::DeviceAssignment;
use crate::ui::messages::{info, success};
use crate::utils::colors::colorize_optional;
use crate::utils::table::Table;
use crate::utils::time::format_local;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Device { action } = cmd else {
        return Ok(());
    };

    let pool = open_pool(cfg)?;

    match action {
        DeviceAction::Set {
            device,
            name,
            location,
            notes,
        } => {
            let device = device.trim();
            if device.is_empty() {
                return Err(AppError::InvalidEvent("device id must not be empty".into()));
            }

            let existed = load_device(&pool.conn, device)?.is_some();
            let dev = DeviceAssignment {
                device_name: name.clone(),
                location: location.clone(),
                notes: notes.clone(),
                ..DeviceAssignment::new(device)
            };
            upsert_device(&pool.conn, &dev)?;

            if existed {
                success(format!("Device {} updated.", device));
            } else {
                success(format!("Device {} registered.", device));
            }
            ttlog_quiet(
                &pool.conn,
                "device_set",
                device,
                dev.device_name.as_deref().unwrap_or("Device registered"),
            );
        }

        DeviceAction::List => {
            let devices = load_devices(&pool.conn)?;
            if devices.is_empty() {
                info("No registered devices: events from any device are accepted.");
                return Ok(());
            }

            let tz = cfg.tz()?;
            let mut table = Table::new(&["DEVICE", "NAME", "LOCATION", "NOTES", "REGISTERED"]);
            for d in &devices {
                table.add_row(vec![
                    d.device_id.clone(),
                    colorize_optional(d.device_name.as_deref()),
                    colorize_optional(d.location.as_deref()),
                    colorize_optional(d.notes.as_deref()),
                    format_local(&d.assigned_at, &tz, "%Y-%m-%d %H:%M"),
                ]);
            }
            print!("{}", table.render());
        }

        DeviceAction::Del { device } => {
            delete_device(&pool.conn, device)?;
            success(format!("Device {} removed.", device));
            ttlog_quiet(&pool.conn, "device_del", device, "Device registration removed");
        }
    }

    Ok(())
}
