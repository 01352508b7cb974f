//! Sandbox title resolution.

use chrono::NaiveDateTime;
use std::sync::Arc;

/// Prefix used for synthesized titles when none is configured.
pub const DEFAULT_TITLE_PREFIX: &str = "Shopping App";

/// Sortable, second-precision timestamp used in synthesized titles.
const TITLE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Source of "now" for default titles.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// The wall clock in local time.
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Local::now().naive_local())
}

/// Use `explicit` when given, otherwise `"<prefix> – <YYYYMMDD_HHMMSS>"`.
///
/// `clock` is only called when a title has to be synthesized.
pub fn resolve_title(explicit: Option<&str>, prefix: &str, clock: &Clock) -> String {
    match explicit {
        Some(title) => title.to_string(),
        None => format!("{prefix} – {}", clock().format(TITLE_TIMESTAMP_FORMAT)),
    }
}
