use crate::cli::commands::{open_pool, resolve_days};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::source::{EventSource, TagDirectory};
use crate::errors::AppResult;
use crate::models::tag::{TagLookup, index_by_tag};
use crate::ui::messages::info;
use crate::utils::colors::{colorize_kind, colorize_optional};
use crate::utils::date::{days_to_utc, today_in};
use crate::utils::table::Table;
use crate::utils::time::format_local;

/// Handle the `events` command: raw events in the selected days.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Events { days, period, tag } = cmd {
        let tz = cfg.tz()?;
        let (from, to) = resolve_days(today_in(&tz), false, period.as_deref(), *days, cfg)?;
        let (start, end) = days_to_utc(from, to, &tz);

        let pool = open_pool(cfg)?;
        let mut events = pool.events_between(start, end)?;
        if let Some(t) = tag {
            events.retain(|e| &e.tag_id == t);
        }

        if events.is_empty() {
            info(format!("No events between {} and {}.", from, to));
            return Ok(());
        }

        let tags = index_by_tag(&pool.tag_assignments()?);

        let mut table = Table::new(&["ID", "TIME", "TYPE", "TAG", "DEVICE", "PRESENT", "PROJECT/TASK"]);
        for e in &events {
            let label = tags.assignment(&e.tag_id).map(|a| a.label());
            table.add_row(vec![
                e.id.to_string(),
                format_local(&e.timestamp, &tz, "%Y-%m-%d %H:%M:%S"),
                colorize_kind(e.kind),
                e.tag_id.clone(),
                e.device_id.clone(),
                if e.tag_present { "yes" } else { "no" }.to_string(),
                colorize_optional(label.as_deref()),
            ]);
        }

        println!("📋 Events {} → {} ({}):\n", from, to, tz);
        print!("{}", table.render());
    }

    Ok(())
}
