use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// A schema step. Applied once, then recorded in `log` as `migration_applied`.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250410_0001_create_rfid_events",
        description: "Created rfid events table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS events (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id       TEXT NOT NULL,
            device_id    TEXT NOT NULL,
            event_type   TEXT NOT NULL CHECK(event_type IN ('tag_insert','tag_removed')),
            timestamp    TEXT NOT NULL,
            tag_present  INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);
        CREATE INDEX IF NOT EXISTS idx_events_tag_timestamp ON events(tag_id, timestamp);
        "#,
    },
    Migration {
        version: "20250410_0002_create_tag_assignments",
        description: "Created tag_assignments table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS tag_assignments (
            tag_id                 TEXT PRIMARY KEY,
            project_name           TEXT,
            task_name              TEXT,
            is_reflection_trigger  INTEGER NOT NULL DEFAULT 0,
            assigned_at            TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250414_0003_create_device_assignments",
        description: "Created device_assignments table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS device_assignments (
            device_id    TEXT PRIMARY KEY,
            device_name  TEXT,
            location     TEXT,
            notes        TEXT,
            assigned_at  TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250502_0004_add_device_diagnostics",
        description: "Added tag_type, wifi_status, time_status to events",
        sql: r#"
        ALTER TABLE events ADD COLUMN tag_type TEXT;
        ALTER TABLE events ADD COLUMN wifi_status TEXT;
        ALTER TABLE events ADD COLUMN time_status TEXT;
        "#,
    },
];

/// Ensure that the `log` table exists. Migrations are tracked there.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(m.sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;
    tx.commit()?;

    tracing::info!(version = m.version, "migration applied");
    Ok(())
}

/// Public entry point: run all pending migrations, in order.
/// Returns the number of migrations applied by this call.
///
/// Invocata da db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        applied += 1;
    }

    if applied > 0 {
        success(format!("Applied {applied} database migration(s)."));
    }

    Ok(applied)
}
