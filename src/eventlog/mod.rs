//! Event Log Module
//!
//! Durable, per-category, append-only logs for one race session, and the
//! merging reader that replays them in global chronological order.
//!
//! ## Responsibilities
//! - Create the five category logs of a session as a set
//! - Append events to the log of their category, in write order
//! - K-way merge the logs back into a single timestamp-ordered stream
//!
//! ## Directory Layout
//! ```text
//! {data_dir}/
//! └── {tag}/
//!     ├── start        SessionStart        (exactly one line)
//!     ├── events       SensorSample        ─┐
//!     ├── velocities   VelocitySample       │ one JSON object
//!     ├── penalties    PenaltyNotice        │ per line
//!     ├── power        PowerCommand        ─┘
//!     └── metadata     comments + tags     (optional, see session module)
//! ```
//!
//! Each category is monotonic in time on its own; the files are not
//! ordered relative to each other, hence the merge on replay.

mod writer;
mod cursor;
mod merge;

use std::path::{Path, PathBuf};

use crate::event::Category;

pub use writer::SessionWriter;
pub use cursor::CategoryCursor;
pub use merge::{Pull, ReplayEvents, SessionReader};

/// Directory of the session `tag` below `root`
pub fn session_dir(root: &Path, tag: &str) -> PathBuf {
    root.join(tag)
}

/// True if `root/tag` holds a recorded session
///
/// A directory counts only once its `start` log exists.
pub fn is_session(root: &Path, tag: &str) -> bool {
    category_path(root, tag, Category::SessionStart).is_file()
}

/// Path of one category log of a session
pub fn category_path(root: &Path, tag: &str, category: Category) -> PathBuf {
    session_dir(root, tag).join(category.file_name())
}
