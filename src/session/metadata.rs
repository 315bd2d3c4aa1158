//! Session metadata
//!
//! Freeform operator annotations attached to a session.

use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PitlogError, Result};

/// Name of the metadata record inside a session directory
pub const METADATA_FILENAME: &str = "metadata";

/// Comments and labels of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// In the order they were added
    #[serde(default)]
    pub comments: Vec<String>,

    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Metadata {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the record of a session directory; empty if none was written
    pub(crate) fn load(session_dir: &Path, tag: &str) -> Result<Self> {
        let path = session_dir.join(METADATA_FILENAME);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::empty()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|e| PitlogError::MalformedMetadata {
            tag: tag.to_string(),
            reason: e.to_string(),
        })
    }

    /// Rewrite the record of a session directory
    ///
    /// Written to a sibling temp file first, then renamed over the record.
    pub(crate) fn save(&self, session_dir: &Path) -> Result<()> {
        let path = session_dir.join(METADATA_FILENAME);
        let tmp_path = session_dir.join(format!("{}.tmp", METADATA_FILENAME));

        let json = serde_json::to_vec(self)?;
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
