//! Fetch boundary between the stores and the pure aggregation core.
//!
//! Callers fetch first, then aggregate. A failed fetch surfaces as
//! `AppError::Fetch` and nothing partial is ever handed to the aggregator.

use crate::db::pool::DbPool;
use crate::db::{devices, queries, tags};
use crate::errors::{AppError, AppResult};
use crate::models::device::DeviceAssignment;
use crate::models::event::Event;
use crate::models::tag::TagAssignment;
use chrono::{DateTime, Utc};

pub trait EventSource {
    /// Events with `from <= timestamp < to`.
    fn events_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<Event>>;
    fn events_for_tag(&self, tag_id: &str) -> AppResult<Vec<Event>>;
    /// Opening INSERT of each session still active at `at`, one per tag.
    fn session_openers(&self, at: DateTime<Utc>) -> AppResult<Vec<Event>>;
    /// First REMOVE of `tag_id` with `timestamp >= from`.
    fn next_remove(&self, tag_id: &str, from: DateTime<Utc>) -> AppResult<Option<Event>>;
}

pub trait TagDirectory {
    fn tag_assignments(&self) -> AppResult<Vec<TagAssignment>>;
}

pub trait DeviceDirectory {
    fn device_assignments(&self) -> AppResult<Vec<DeviceAssignment>>;
}

fn fetch_err(what: &'static str) -> impl Fn(AppError) -> AppError {
    move |e| {
        tracing::error!(what, error = %e, "fetch failed");
        AppError::Fetch {
            what,
            reason: e.to_string(),
        }
    }
}

impl EventSource for DbPool {
    fn events_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<Event>> {
        queries::load_events_between(&self.conn, &from, &to).map_err(fetch_err("events"))
    }

    fn events_for_tag(&self, tag_id: &str) -> AppResult<Vec<Event>> {
        queries::load_events_for_tag(&self.conn, tag_id).map_err(fetch_err("events"))
    }

    fn session_openers(&self, at: DateTime<Utc>) -> AppResult<Vec<Event>> {
        queries::load_session_openers(&self.conn, &at).map_err(fetch_err("events"))
    }

    fn next_remove(&self, tag_id: &str, from: DateTime<Utc>) -> AppResult<Option<Event>> {
        queries::first_remove_from(&self.conn, tag_id, &from).map_err(fetch_err("events"))
    }
}

impl TagDirectory for DbPool {
    fn tag_assignments(&self) -> AppResult<Vec<TagAssignment>> {
        tags::load_tags(&self.conn).map_err(fetch_err("tag assignments"))
    }
}

impl DeviceDirectory for DbPool {
    fn device_assignments(&self) -> AppResult<Vec<DeviceAssignment>> {
        devices::load_devices(&self.conn).map_err(fetch_err("device assignments"))
    }
}
