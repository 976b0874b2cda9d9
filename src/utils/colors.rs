/// ANSI color helper utilities for terminal output.
use crate::models::event_kind::EventKind;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const CYAN: &str = "\x1b[36m";

/// Optional label rendered as "--" in grey when missing.
pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--{RESET}"),
    }
}

/// Insert → green, Remove → red.
pub fn colorize_kind(kind: EventKind) -> String {
    match kind {
        EventKind::Insert => format!("{GREEN}{}{RESET}", kind.label()),
        EventKind::Remove => format!("{RED}{}{RESET}", kind.label()),
    }
}

/// Zero-minute blocks are greyed out.
pub fn colorize_duration(text: &str, minutes: f64) -> String {
    if minutes <= 0.0 {
        format!("{GREY}{text}{RESET}")
    } else {
        text.to_string()
    }
}
