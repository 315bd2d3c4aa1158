//! Session tags
//!
//! A tag is the local wall-clock time of the session start at second
//! resolution, e.g. `20261018-142503`.

use chrono::{DateTime, Local, TimeZone};

/// `chrono` format string of a session tag
pub const TAG_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Tag for a session starting now
pub fn tag_now() -> String {
    tag_for(&Local::now())
}

/// Tag for a session starting at `time`
pub fn tag_for<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TAG_FORMAT).to_string()
}
