use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::logic::Core;
use crate::errors::{AppError, AppResult};
use crate::models::dashboard::DashboardMetrics;
use crate::ui::messages::warning;
use crate::utils::date::{last_days, today_in};
use crate::utils::formatting::bold;
use crate::utils::mins2readable;

/// Handle the `summary` command.
///
/// A failed fetch does not abort: zeros are shown with a warning.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Summary { days, json } = cmd {
        let tz = cfg.tz()?;
        let today = today_in(&tz);
        let window = days.unwrap_or(cfg.metrics_window_days).max(1);

        let pool = open_pool(cfg)?;
        let metrics =
            match Core::build_dashboard(&pool, &tz, today, window, cfg.lookback_hours) {
                Ok(m) => m,
                Err(e @ AppError::Fetch { .. }) => {
                    warning(format!("Metrics unavailable: {e}"));
                    DashboardMetrics::default()
                }
                Err(e) => return Err(e),
            };

        if *json {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            return Ok(());
        }

        let (from, to) = last_days(today, window);
        println!("{}", bold(&format!("📊 Dashboard {} → {} ({})", from, to, tz)));
        println!();
        println!("{:<18} {}", "Active projects:", metrics.active_projects);
        println!("{:<18} {}", "Completed tasks:", metrics.completed_tasks);
        println!("{:<18} {}", "Tags:", metrics.total_tags);
        println!("{:<18} {}", "Devices:", metrics.total_devices);
        println!(
            "{:<18} {}",
            "Today:",
            mins2readable(metrics.today_time_minutes)
        );
        println!(
            "{:<18} {}",
            format!("Last {} days:", window),
            mins2readable(metrics.week_time_minutes)
        );
    }

    Ok(())
}
