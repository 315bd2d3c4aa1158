//! Event definitions
//!
//! Payloads follow the race relay message set: the simulator and the
//! pilot exchange these over the message broker.

use serde::{Deserialize, Serialize};

use super::Category;

/// A race session begins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceStart {
    pub track_id: String,
    pub race_type: String,
    pub team_id: String,
    /// Unix millis at session start
    pub timestamp: u64,
    pub description: String,
    pub qualifying: bool,
}

/// Raw accelerometer / gyroscope / magnetometer reading from the car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub track_id: String,
    pub acc: [i32; 3],
    pub gyr: [i32; 3],
    pub mag: [i32; 3],
    pub timestamp: u64,
}

/// Light-barrier velocity measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityMessage {
    pub track_id: String,
    pub timestamp: u64,
    pub velocity: f64,
    pub source_pid: String,
}

/// Power level sent to the car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerControl {
    pub power: i32,
    pub team_id: String,
    pub access_code: String,
    pub timestamp: u64,
}

/// Speed penalty issued by the track. Carries no timestamp of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyMessage {
    pub track_id: String,
    pub team_id: String,
    pub actual_speed: f64,
    pub speed_limit: f64,
    pub penalty_ms: i64,
}

/// A penalty paired with the time it was captured by the pilot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedPenalty {
    pub captured_at: u64,
    pub notice: PenaltyMessage,
}

/// Any event that can be recorded and replayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    SessionStart(RaceStart),
    SensorSample(SensorEvent),
    VelocitySample(VelocityMessage),
    PowerCommand(PowerControl),
    PenaltyNotice(TimedPenalty),
}

impl Event {
    /// Wrap a penalty with an explicit capture time
    pub fn penalty_at(notice: PenaltyMessage, captured_at: u64) -> Self {
        Event::PenaltyNotice(TimedPenalty {
            captured_at,
            notice,
        })
    }

    /// Wrap a penalty, stamping it with the current wall-clock time
    pub fn penalty_now(notice: PenaltyMessage) -> Self {
        Self::penalty_at(notice, super::now_millis())
    }

    pub fn category(&self) -> Category {
        match self {
            Event::SessionStart(_) => Category::SessionStart,
            Event::SensorSample(_) => Category::SensorSample,
            Event::VelocitySample(_) => Category::VelocitySample,
            Event::PowerCommand(_) => Category::PowerCommand,
            Event::PenaltyNotice(_) => Category::PenaltyNotice,
        }
    }

    /// Millisecond timestamp used for chronological ordering.
    /// Penalties order by their capture time.
    pub fn timestamp(&self) -> u64 {
        match self {
            Event::SessionStart(e) => e.timestamp,
            Event::SensorSample(e) => e.timestamp,
            Event::VelocitySample(e) => e.timestamp,
            Event::PowerCommand(e) => e.timestamp,
            Event::PenaltyNotice(e) => e.captured_at,
        }
    }

    pub fn is_power_command(&self) -> bool {
        matches!(self, Event::PowerCommand(_))
    }

    /// Serialize to a single JSON line (without trailing newline)
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a single JSON line
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}
