use crate::cli::commands::{open_pool, resolve_days};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::logic::{BlockQuery, BlockReport, Core};
use crate::errors::AppResult;
use crate::ui::messages::{header, info, warning};
use crate::utils::colors::{CYAN, RESET, colorize_duration, colorize_optional};
use crate::utils::date::today_in;
use crate::utils::format_duration;
use crate::utils::table::Table;
use crate::utils::time::format_local;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Handle the `blocks` command: closed time blocks per day, then open sessions.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Blocks {
        days,
        period,
        today,
        tag,
        now,
    } = cmd
    {
        let tz = cfg.tz()?;
        let current = Utc::now();
        let (from, to) = resolve_days(today_in(&tz), *today, period.as_deref(), *days, cfg)?;

        let pool = open_pool(cfg)?;
        let report = Core::build_block_report(
            &pool,
            &BlockQuery {
                from,
                to,
                tz: &tz,
                lookback_hours: cfg.lookback_hours,
                as_of: now.then_some(current),
                tag: tag.as_deref(),
            },
        )?;

        print_report(&report, &tz, current);
    }

    Ok(())
}

fn print_report(report: &BlockReport, tz: &Tz, now: DateTime<Utc>) {
    if report.blocks.is_empty() && report.open_sessions.is_empty() {
        if let (Some(from), Some(to)) = (report.from, report.to) {
            info(format!("No time blocks between {} and {}.", from, to));
        }
        return;
    }

    for day in report.days() {
        header(day.format("%A %Y-%m-%d"));

        let blocks = report.blocks_on(day);
        let mut table = Table::new(&["TAG", "PROJECT", "TASK", "START", "END", "DURATION"]);
        for b in &blocks {
            table.add_row(vec![
                b.tag_id.clone(),
                colorize_optional(b.project_name.as_deref()),
                colorize_optional(b.task_name.as_deref()),
                format_local(&b.start_time, tz, "%H:%M:%S"),
                format_local(&b.end_time, tz, "%H:%M:%S"),
                colorize_duration(&format_duration(b.duration_minutes), b.duration_minutes),
            ]);
        }
        print!("{}", table.render());

        let total: f64 = blocks.iter().map(|b| b.duration_minutes).sum();
        println!("Total: {}", format_duration(total));
    }

    if !report.open_sessions.is_empty() {
        header("Open sessions");
        let mut table = Table::new(&["TAG", "PROJECT", "TASK", "DEVICE", "SINCE", "ELAPSED"]);
        for s in &report.open_sessions {
            table.add_row(vec![
                format!("{CYAN}{}{RESET}", s.tag_id),
                colorize_optional(s.project_name.as_deref()),
                colorize_optional(s.task_name.as_deref()),
                s.device_id.clone(),
                format_local(&s.start_time, tz, "%Y-%m-%d %H:%M"),
                format_duration(s.elapsed_minutes(now)),
            ]);
        }
        print!("{}", table.render());
    }

    let a = report.anomalies;
    if a.total() > 0 {
        warning(format!(
            "{} duplicate insert(s) and {} orphan remove(s) ignored.",
            a.duplicate_inserts, a.orphan_removes
        ));
    }
}
