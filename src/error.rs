//! Error types for PitLog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using PitlogError
pub type Result<T> = std::result::Result<T, PitlogError>;

/// Unified error type for PitLog operations
#[derive(Debug, Error)]
pub enum PitlogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Session already exists: {0}")]
    DuplicateSession(String),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Malformed record in session {tag}, {category} line {line}: {reason}")]
    MalformedRecord {
        tag: String,
        category: String,
        line: usize,
        reason: String,
    },

    #[error("Malformed metadata for session {tag}: {reason}")]
    MalformedMetadata { tag: String, reason: String },

    // -------------------------------------------------------------------------
    // Controller Errors
    // -------------------------------------------------------------------------
    #[error("Recording in progress for session {0}")]
    RecordingInProgress(String),

    #[error("Replay in progress for session {0}")]
    ReplayInProgress(String),

    #[error("Controller stopped")]
    ControllerStopped,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PitlogError {
    /// True for errors caused by the caller asking for something the
    /// current state does not allow (as opposed to storage faults).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            PitlogError::RecordingInProgress(_) | PitlogError::ReplayInProgress(_)
        )
    }
}

impl From<serde_json::Error> for PitlogError {
    fn from(e: serde_json::Error) -> Self {
        PitlogError::Serialization(e.to_string())
    }
}
