//! Session Module
//!
//! Enumeration and annotation of recorded sessions.
//!
//! ## Responsibilities
//! - Derive filesystem-safe tags from the session start time
//! - List sessions with their creation time and metadata
//! - Append comments and replace the tag set of a session
//!
//! ## Metadata Record
//! Stored as `{data_dir}/{tag}/metadata`, rewritten as a whole on every
//! update:
//! ```text
//! {"comments":["slow in turn 3","retry with 140"],"tags":["fast","qualifying"]}
//! ```

mod tag;
mod metadata;
mod store;

pub use tag::{tag_for, tag_now, TAG_FORMAT};
pub use metadata::{Metadata, METADATA_FILENAME};
pub use store::{is_valid_tag, SessionInfo, SessionStore};
