//! Session Writer
//!
//! Handles appending events to the category logs of one session.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::LogSyncStrategy;
use crate::error::{PitlogError, Result};
use crate::event::{Category, Event};

use super::session_dir;

/// Writes events to the five category logs of a session
///
/// Once `close()` has been called the writer stays alive but drops every
/// further append: stragglers arriving during teardown are expected.
pub struct SessionWriter {
    /// Session tag (directory name)
    tag: String,

    /// Session directory
    dir: PathBuf,

    /// One buffered handle per category, indexed by `Category::index()`.
    /// Empty once closed.
    files: Vec<BufWriter<File>>,

    /// Records appended per category
    counts: [u64; 5],

    /// When to fsync
    sync_strategy: LogSyncStrategy,

    /// Appends since the last sync
    uncommitted: usize,

    /// False after close
    recording: bool,
}

impl SessionWriter {
    /// Create the session directory and its five category logs
    ///
    /// Fails with `DuplicateSession` if the directory already exists; the
    /// existing session is left untouched.
    pub fn open(root: &Path, tag: &str, sync_strategy: LogSyncStrategy) -> Result<Self> {
        fs::create_dir_all(root)?;

        let dir = session_dir(root, tag);
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PitlogError::DuplicateSession(tag.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        let files = match Self::create_logs(&dir) {
            Ok(files) => files,
            Err(e) => {
                // Never leave a half-created session behind
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    tracing::warn!(tag, "Failed to remove partial session: {}", cleanup);
                }
                return Err(e);
            }
        };

        tracing::info!(tag, dir = %dir.display(), "Session logs created");

        Ok(Self {
            tag: tag.to_string(),
            dir,
            files,
            counts: [0; 5],
            sync_strategy,
            uncommitted: 0,
            recording: true,
        })
    }

    fn create_logs(dir: &Path) -> Result<Vec<BufWriter<File>>> {
        Category::ALL
            .iter()
            .map(|category| {
                let file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(dir.join(category.file_name()))?;
                Ok(BufWriter::new(file))
            })
            .collect()
    }

    /// Append an event to the log of its category
    ///
    /// Returns `Ok(false)` when the writer is closed and the event was
    /// dropped.
    pub fn append(&mut self, event: &Event) -> Result<bool> {
        if !self.recording {
            tracing::trace!(
                tag = %self.tag,
                category = %event.category(),
                "Dropping event after close"
            );
            return Ok(false);
        }

        let category = event.category();
        let mut line = event.to_line()?;
        line.push('\n');

        self.files[category.index()].write_all(line.as_bytes())?;
        self.counts[category.index()] += 1;
        self.uncommitted += 1;

        match self.sync_strategy {
            LogSyncStrategy::EveryWrite => self.sync()?,
            LogSyncStrategy::EveryNEntries { count } => {
                if self.uncommitted >= count {
                    self.sync()?;
                }
            }
        }

        Ok(true)
    }

    /// Flush buffers and fsync every category log
    pub fn sync(&mut self) -> Result<()> {
        for file in &mut self.files {
            file.flush()?;
            file.get_ref().sync_data()?;
        }
        self.uncommitted = 0;
        Ok(())
    }

    /// Flush and release all handles. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if !self.recording {
            return Ok(());
        }
        self.recording = false;

        let result = self.sync();
        self.files.clear();

        tracing::info!(
            tag = %self.tag,
            records = self.total_records(),
            "Session logs closed"
        );
        result
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Appends not yet fsynced
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Records appended to one category
    pub fn record_count(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    pub fn total_records(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl Drop for SessionWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(tag = %self.tag, "Failed to close session logs: {}", e);
        }
    }
}
