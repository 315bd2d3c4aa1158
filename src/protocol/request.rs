//! Request definitions
//!
//! Represents requests from operators and telemetry adapters.

use crate::event::{Event, PenaltyMessage};

/// Request types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestType {
    Ping = 0x01,
    ListSessions = 0x02,
    AddComment = 0x03,
    ReplaceTags = 0x04,
    StartReplay = 0x05,
    StopReplay = 0x06,
    Publish = 0x07,
    StopSession = 0x08,
    Status = 0x09,
    PublishPenalty = 0x0A,
}

impl RequestType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(RequestType::Ping),
            0x02 => Some(RequestType::ListSessions),
            0x03 => Some(RequestType::AddComment),
            0x04 => Some(RequestType::ReplaceTags),
            0x05 => Some(RequestType::StartReplay),
            0x06 => Some(RequestType::StopReplay),
            0x07 => Some(RequestType::Publish),
            0x08 => Some(RequestType::StopSession),
            0x09 => Some(RequestType::Status),
            0x0A => Some(RequestType::PublishPenalty),
            _ => None,
        }
    }
}

/// A parsed request
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Health check
    Ping,

    /// List recorded sessions with their metadata
    ListSessions,

    /// Append a comment to a session
    AddComment { tag: String, text: String },

    /// Replace the label set of a session
    ReplaceTags { tag: String, tags: Vec<String> },

    /// Replay a recorded session
    StartReplay { tag: String },

    /// Cancel the running replay
    StopReplay,

    /// Live telemetry from the broker adapter
    Publish { event: Event },

    /// The race ended; close the current recording
    StopSession,

    /// Report what the controller is doing
    Status,

    /// Penalty notice from the track, stamped on receipt
    PublishPenalty { notice: PenaltyMessage },
}

impl Request {
    /// Get the request type
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::Ping => RequestType::Ping,
            Request::ListSessions => RequestType::ListSessions,
            Request::AddComment { .. } => RequestType::AddComment,
            Request::ReplaceTags { .. } => RequestType::ReplaceTags,
            Request::StartReplay { .. } => RequestType::StartReplay,
            Request::StopReplay => RequestType::StopReplay,
            Request::Publish { .. } => RequestType::Publish,
            Request::StopSession => RequestType::StopSession,
            Request::Status => RequestType::Status,
            Request::PublishPenalty { .. } => RequestType::PublishPenalty,
        }
    }
}
