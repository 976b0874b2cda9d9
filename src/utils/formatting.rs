//! Formatting utilities used for CLI and export outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Human duration: "2h 30m" from one hour up, "45m" below.
/// Fractional minutes are truncated, negative values shown as 0.
pub fn format_duration(minutes: f64) -> String {
    if !minutes.is_finite() || minutes <= 0.0 {
        return "0m".to_string();
    }

    let total = minutes.trunc() as i64;
    let (hours, mins) = (total / 60, total % 60);
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Fixed-width "HH:MM" rendering, e.g. for dashboard totals.
pub fn mins2readable(minutes: f64) -> String {
    let m = minutes.max(0.0).trunc() as i64;
    format!("{:02}h {:02}m", m / 60, m % 60)
}
