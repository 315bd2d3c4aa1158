//! Controller Module
//!
//! The recorder/player state machine of one car and the single-threaded
//! driver that feeds it.
//!
//! ## States
//! ```text
//!            SessionStart                      start_replay(tag)
//!   ┌──────┐ ───────────► ┌───────────┐   ┌──────┐ ──────────► ┌───────────┐
//!   │ Idle │              │ Recording │   │ Idle │             │ Replaying │
//!   └──────┘ ◄─────────── └───────────┘   └──────┘ ◄────────── └───────────┘
//!             stop_session                     EndOfStream / stop_replay
//! ```
//! Recording and Replaying never overlap: a replay request while recording
//! is rejected.
//!
//! ## Concurrency
//! The state machine itself is plain single-threaded code. `Controller`
//! runs it on a dedicated thread that handles one inbound message or one
//! replay tick at a time.

mod downstream;
mod machine;
mod driver;

pub use downstream::{Downstream, Outbound};
pub use machine::{Activity, ControllerStatus, RecorderPlayer, TagSource};
pub use driver::{Controller, ControllerHandle};
