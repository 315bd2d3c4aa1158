//! Session Store
//!
//! Discovers recorded sessions below the data directory and manages their
//! metadata records.

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PitlogError, Result};
use crate::eventlog;

use super::Metadata;

/// One recorded session as seen by the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub tag: String,
    pub created: DateTime<Utc>,
    pub metadata: Metadata,
}

/// Stateless view over the session directories of a data root
///
/// Metadata updates are read-modify-write without locking: two writers
/// updating the same tag at once may lose an update.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    /// Open the store, creating the data directory if needed
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a session, whether or not it exists
    pub fn session_dir(&self, tag: &str) -> PathBuf {
        eventlog::session_dir(&self.root, tag)
    }

    /// True if `tag` names a recorded session
    pub fn exists(&self, tag: &str) -> bool {
        is_valid_tag(tag) && eventlog::is_session(&self.root, tag)
    }

    /// List all sessions, sorted by tag (oldest first)
    ///
    /// Directories without a `start` log are not sessions and are skipped.
    /// A session whose metadata cannot be parsed is listed with empty
    /// metadata.
    pub fn list(&self) -> Result<Vec<SessionInfo>> {
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let Some(tag) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !eventlog::is_session(&self.root, tag) {
                continue;
            }

            let fs_meta = entry.metadata()?;
            let created = fs_meta
                .created()
                .or_else(|_| fs_meta.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            let metadata = match Metadata::load(&path, tag) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(tag, "Ignoring unreadable metadata: {}", e);
                    Metadata::empty()
                }
            };

            sessions.push(SessionInfo {
                tag: tag.to_string(),
                created,
                metadata,
            });
        }

        sessions.sort_by(|a, b| a.tag.cmp(&b.tag));
        Ok(sessions)
    }

    /// Metadata of one session
    pub fn metadata(&self, tag: &str) -> Result<Metadata> {
        let dir = self.existing_dir(tag)?;
        Metadata::load(&dir, tag)
    }

    /// Append a comment to a session's metadata
    pub fn append_comment(&self, tag: &str, text: &str) -> Result<Metadata> {
        let dir = self.existing_dir(tag)?;
        let mut metadata = Metadata::load(&dir, tag)?;
        metadata.comments.push(text.to_string());
        metadata.save(&dir)?;

        tracing::debug!(tag, comments = metadata.comments.len(), "Comment added");
        Ok(metadata)
    }

    /// Replace the whole tag set of a session
    pub fn replace_tags<I, S>(&self, tag: &str, tags: I) -> Result<Metadata>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dir = self.existing_dir(tag)?;
        let mut metadata = Metadata::load(&dir, tag)?;
        metadata.tags = tags.into_iter().map(Into::into).collect();
        metadata.save(&dir)?;

        tracing::debug!(tag, tags = ?metadata.tags, "Tags replaced");
        Ok(metadata)
    }

    fn existing_dir(&self, tag: &str) -> Result<PathBuf> {
        if !self.exists(tag) {
            return Err(PitlogError::UnknownSession(tag.to_string()));
        }
        Ok(self.session_dir(tag))
    }
}

/// A tag must be a single plain path component
pub fn is_valid_tag(tag: &str) -> bool {
    let mut components = Path::new(tag).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
