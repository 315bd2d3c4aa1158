//! Event categories
//!
//! Each category owns exactly one log file inside a session directory.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The five event categories recorded per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SessionStart,
    SensorSample,
    VelocitySample,
    PenaltyNotice,
    PowerCommand,
}

impl Category {
    /// All categories, in on-disk layout order
    pub const ALL: [Category; 5] = [
        Category::SessionStart,
        Category::SensorSample,
        Category::VelocitySample,
        Category::PenaltyNotice,
        Category::PowerCommand,
    ];

    /// Name of the log file holding this category
    pub fn file_name(self) -> &'static str {
        match self {
            Category::SessionStart => "start",
            Category::SensorSample => "events",
            Category::VelocitySample => "velocities",
            Category::PenaltyNotice => "penalties",
            Category::PowerCommand => "power",
        }
    }

    /// Position in `ALL`, used to index per-category slots
    pub fn index(self) -> usize {
        match self {
            Category::SessionStart => 0,
            Category::SensorSample => 1,
            Category::VelocitySample => 2,
            Category::PenaltyNotice => 3,
            Category::PowerCommand => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
