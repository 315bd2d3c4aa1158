//! Response definitions
//!
//! Represents responses to clients.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PitlogError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Rejected = 0x02,
    Error = 0x03,
}

impl Status {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::Rejected),
            0x03 => Some(Status::Error),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (JSON result for OK, message otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response without payload
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            payload: None,
        }
    }

    /// Create an OK response carrying `value` as JSON
    pub fn ok_json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            status: Status::Ok,
            payload: Some(serde_json::to_vec(value)?),
        })
    }

    pub fn not_found(message: &str) -> Self {
        Self::with_message(Status::NotFound, message)
    }

    pub fn rejected(message: &str) -> Self {
        Self::with_message(Status::Rejected, message)
    }

    pub fn error(message: &str) -> Self {
        Self::with_message(Status::Error, message)
    }

    fn with_message(status: Status, message: &str) -> Self {
        Self {
            status,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Map a failed operation onto a response
    pub fn from_error(error: &PitlogError) -> Self {
        match error {
            PitlogError::UnknownSession(_) => Self::not_found(&error.to_string()),
            e if e.is_precondition() => Self::rejected(&e.to_string()),
            PitlogError::DuplicateSession(_) => Self::rejected(&error.to_string()),
            e => Self::error(&e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Payload as text (error messages)
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }

    /// Decode the JSON payload of an OK response
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let payload = self
            .payload
            .as_deref()
            .ok_or_else(|| PitlogError::Protocol("response has no payload".to_string()))?;
        Ok(serde_json::from_slice(payload)?)
    }
}
