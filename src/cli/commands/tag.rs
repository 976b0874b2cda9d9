use crate::cli::commands::open_pool;
use crate::cli::parser::{Commands, TagAction};
use crate::config::Config;
use crate::db::log::ttlog_quiet;
use crate::db::tags::{delete_tag, load_tag, load_tags, upsert_tag};
use crate::errors::{AppError, AppResult};
use crate::models::tag::TagAssignment;
use crate::ui::messages::{info, success};
use crate::utils::colors::colorize_optional;
use crate::utils::table::Table;
use crate::utils::time::format_local;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Tag { action } = cmd else {
        return Ok(());
    };

    let pool = open_pool(cfg)?;

    match action {
        TagAction::Set {
            tag,
            project,
            task,
            reflection,
        } => {
            let tag = tag.trim();
            if tag.is_empty() {
                return Err(AppError::InvalidEvent("tag id must not be empty".into()));
            }

            let mut assignment = TagAssignment::new(tag, project.as_deref(), task.as_deref());
            assignment.is_reflection_trigger = *reflection;

            let existed = load_tag(&pool.conn, tag)?.is_some();
            upsert_tag(&pool.conn, &assignment)?;

            let verb = if existed { "updated" } else { "assigned" };
            success(format!("Tag {} {} → {}", tag, verb, assignment.label()));
            ttlog_quiet(&pool.conn, "tag_set", tag, &assignment.label());
        }

        TagAction::List => {
            let tags = load_tags(&pool.conn)?;
            if tags.is_empty() {
                info("No tag assignments.");
                return Ok(());
            }

            let tz = cfg.tz()?;
            let mut table = Table::new(&["TAG", "PROJECT", "TASK", "REFLECTION", "ASSIGNED"]);
            for t in &tags {
                table.add_row(vec![
                    t.tag_id.clone(),
                    colorize_optional(t.project_name.as_deref()),
                    colorize_optional(t.task_name.as_deref()),
                    if t.is_reflection_trigger { "yes" } else { "" }.to_string(),
                    format_local(&t.assigned_at, &tz, "%Y-%m-%d %H:%M"),
                ]);
            }
            print!("{}", table.render());
        }

        TagAction::Del { tag } => {
            delete_tag(&pool.conn, tag)?;
            success(format!("Tag {} removed.", tag));
            ttlog_quiet(&pool.conn, "tag_del", tag, "Tag assignment removed");
        }
    }

    Ok(())
}
