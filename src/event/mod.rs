//! Event Module
//!
//! The telemetry and control events that flow through a race session.
//!
//! ## Responsibilities
//! - One tagged `Event` type covering all five categories
//! - Category discriminant used to route events to their log file
//! - Uniform millisecond timestamp used by the replay merge
//!
//! ## Line Format
//! Every event serializes to a single self-describing JSON object whose
//! `kind` field names the category:
//! ```text
//! {"kind":"sensor_sample","track_id":"t1","acc":[1,2,4],"gyr":[0,0,10],"mag":[6,7,8],"timestamp":10}
//! {"kind":"penalty_notice","captured_at":23,"notice":{"track_id":"t1",...}}
//! ```

mod category;
mod types;

pub use category::Category;
pub use types::{
    Event, PenaltyMessage, PowerControl, RaceStart, SensorEvent, TimedPenalty, VelocityMessage,
};

/// Wall-clock time in unix milliseconds
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
