use crate::export::ExportFormat;
use crate::models::event_kind::EventKind;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rTagTracker
/// CLI application turning RFID tag insert/remove events into time blocks
#[derive(Parser)]
#[command(
    name = "rtagtracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track time from RFID tag insert/remove events: time blocks and dashboard metrics on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the reference timezone (IANA name, e.g. Europe/Rome)
    #[arg(global = true, long = "tz")]
    pub tz: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Record a single device event
    Event {
        #[arg(long = "tag", help = "RFID tag identifier")]
        tag: String,

        #[arg(long = "device", help = "Reporting device identifier")]
        device: String,

        #[arg(
            long = "type",
            value_parser = parse_kind,
            help = "Event type: tag_insert | tag_removed"
        )]
        kind: EventKind,

        #[arg(
            long = "at",
            help = "Event instant: RFC 3339, 'YYYY-MM-DD HH:MM[:SS]' or 'HH:MM' (local, default now)"
        )]
        at: Option<String>,

        #[arg(
            long = "present",
            help = "Tag presence reported by the device (default: derived from --type)"
        )]
        present: Option<bool>,
    },

    /// Validate and store device payloads from a JSON file
    Ingest {
        #[arg(long, value_name = "FILE")]
        file: String,
    },

    /// Manage tag → project/task assignments
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage device registrations
    Device {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// List raw events
    Events {
        #[arg(long, help = "Number of days ending today")]
        days: Option<u32>,

        #[arg(long, short, help = "Filter by year/month/day or a custom range")]
        period: Option<String>,

        #[arg(long)]
        tag: Option<String>,
    },

    /// List time blocks grouped by day, plus open sessions
    Blocks {
        #[arg(long, help = "Number of days ending today")]
        days: Option<u32>,

        #[arg(long, short, help = "Filter by year/month/day or a custom range")]
        period: Option<String>,

        #[arg(long = "today", help = "Show only today's blocks")]
        today: bool,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long = "now", help = "Close open sessions at the current instant")]
        now: bool,
    },

    /// Dashboard metrics
    Summary {
        #[arg(long, help = "Window length in days (default from config)")]
        days: Option<u32>,

        #[arg(long, help = "Print metrics as JSON")]
        json: bool,
    },

    /// Export time blocks (or raw events)
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, short = 'e', help = "Export raw events instead of time blocks")]
        events: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Assign a tag to a project/task (creates or replaces)
    Set {
        tag: String,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        task: Option<String>,

        #[arg(long, help = "Mark the tag as a reflection trigger")]
        reflection: bool,
    },
    /// List tag assignments
    List,
    /// Remove a tag assignment
    Del { tag: String },
}

#[derive(Subcommand)]
pub enum DeviceAction {
    /// Register or update a device
    Set {
        device: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// List registered devices
    List,
    /// Remove a device registration
    Del { device: String },
}

fn parse_kind(s: &str) -> Result<EventKind, String> {
    EventKind::from_wire(s).ok_or_else(|| format!("expected tag_insert or tag_removed, got '{s}'"))
}
