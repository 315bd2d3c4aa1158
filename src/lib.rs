//! # PitLog
//!
//! Race session recorder and deterministic replayer for a remote-controlled
//! race-car pilot:
//! - Per-category append-only event logs for every race session
//! - K-way merge replay in global timestamp order
//! - Single-threaded recorder/player state machine per car
//! - Session listing and annotation (comments, tags)
//! - TCP operator protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │        (operators, telemetry broker adapter)                 │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ record / replay              │ list / annotate
//! ┌──────────────▼──────────────┐        ┌──────▼──────────────┐
//! │   Controller (one thread)   │        │    SessionStore     │
//! │  Idle | Recording | Replay  │        │ (metadata records)  │
//! └──────┬───────────────┬──────┘        └─────────────────────┘
//!        │               │ tick
//!        ▼               ▼
//!  ┌─────────────┐ ┌─────────────┐        ┌─────────────────────┐
//!  │SessionWriter│ │SessionReader│ ─────► │     Downstream      │
//!  │  (append)   │ │  (k-merge)  │        │ (live-path consumer)│
//!  └─────────────┘ └─────────────┘        └─────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod event;
pub mod eventlog;
pub mod session;
pub mod controller;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PitlogError, Result};
pub use config::Config;
pub use controller::{Controller, ControllerHandle, RecorderPlayer};
pub use event::{Category, Event};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PitLog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
