//! Session Reader
//!
//! Reconstructs the global chronological order of a closed session by
//! k-way merging its category logs.
//!
//! ## Merge Step
//! ```text
//!   heads:  events[10]  velocities[21]  penalties[23]  power[15]
//!              ▲ smallest timestamp
//!   emit events[10], advance `events` only, keep the other heads
//! ```
//! A category whose log is exhausted is dropped for good. SessionStart is
//! not part of the comparison: it is always emitted first.

use std::path::Path;

use crate::error::{PitlogError, Result};
use crate::event::{Category, Event};

use super::{category_path, is_session, CategoryCursor};

/// Result of one merge step
#[derive(Debug, Clone, PartialEq)]
pub enum Pull {
    Event(Event),
    /// Every category is exhausted; the replay is complete
    EndOfStream,
}

/// A category cursor together with its next unconsumed record
struct Head {
    event: Event,
    cursor: CategoryCursor,
}

/// Forward-only merged reader over one session
///
/// Each reader has private cursor state; any number of readers may be
/// opened on the same closed session.
pub struct SessionReader {
    tag: String,

    /// Start log, consumed by the first pull
    start: Option<CategoryCursor>,

    /// Opened but not yet read, consumed by the first pull
    unprimed: Vec<CategoryCursor>,

    /// Categories with a pending record, in `Category::ALL` order
    heads: Vec<Head>,

    primed: bool,
    finished: bool,
}

impl SessionReader {
    /// Open all category logs of session `tag`
    ///
    /// No record is read until the first `pull()`.
    pub fn open(root: &Path, tag: &str) -> Result<Self> {
        if !is_session(root, tag) {
            return Err(PitlogError::UnknownSession(tag.to_string()));
        }

        let mut start = None;
        let mut unprimed = Vec::with_capacity(Category::ALL.len() - 1);
        for category in Category::ALL {
            let cursor = CategoryCursor::open(&category_path(root, tag, category), tag, category)?;
            if category == Category::SessionStart {
                start = Some(cursor);
            } else {
                unprimed.push(cursor);
            }
        }

        tracing::debug!(tag, "Session opened for replay");

        Ok(Self {
            tag: tag.to_string(),
            start,
            unprimed,
            heads: Vec::new(),
            primed: false,
            finished: false,
        })
    }

    /// Perform exactly one merge step
    ///
    /// Never blocks waiting for new data. Any error is fatal: all handles
    /// are released and later pulls report `EndOfStream`.
    pub fn pull(&mut self) -> Result<Pull> {
        if self.finished {
            return Ok(Pull::EndOfStream);
        }

        match self.step() {
            Ok(Pull::EndOfStream) => {
                tracing::debug!(tag = %self.tag, "Replay reached end of stream");
                self.close();
                Ok(Pull::EndOfStream)
            }
            Ok(pull) => Ok(pull),
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    fn step(&mut self) -> Result<Pull> {
        if !self.primed {
            self.primed = true;
            let start = self.prime()?;
            if let Some(event) = start {
                return Ok(Pull::Event(event));
            }
            tracing::warn!(tag = %self.tag, "Session has no start record");
        }

        // First minimum wins, so ties fall to the earlier category
        let next = self
            .heads
            .iter()
            .enumerate()
            .min_by_key(|(_, head)| head.event.timestamp())
            .map(|(i, _)| i);

        let Some(index) = next else {
            return Ok(Pull::EndOfStream);
        };

        let following = self.heads[index].cursor.next_record()?;
        let event = match following {
            Some(following) => std::mem::replace(&mut self.heads[index].event, following),
            None => self.heads.remove(index).event,
        };

        Ok(Pull::Event(event))
    }

    /// Read the start record and the first record of every other category
    fn prime(&mut self) -> Result<Option<Event>> {
        let start = match self.start.take() {
            Some(mut cursor) => cursor.next_record()?,
            None => None,
        };

        for mut cursor in std::mem::take(&mut self.unprimed) {
            if let Some(event) = cursor.next_record()? {
                self.heads.push(Head { event, cursor });
            }
        }

        Ok(start)
    }

    /// Release all file handles; further pulls report `EndOfStream`
    pub fn close(&mut self) {
        self.start = None;
        self.unprimed.clear();
        self.heads.clear();
        self.finished = true;
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of category logs still held open
    pub fn open_categories(&self) -> usize {
        usize::from(self.start.is_some()) + self.unprimed.len() + self.heads.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Adapt into an iterator that ends at `EndOfStream`
    pub fn into_events(self) -> ReplayEvents {
        ReplayEvents {
            reader: self,
            failed: false,
        }
    }
}

/// Iterator over the merged events of a session
pub struct ReplayEvents {
    reader: SessionReader,
    failed: bool,
}

impl Iterator for ReplayEvents {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.pull() {
            Ok(Pull::Event(event)) => Some(Ok(event)),
            Ok(Pull::EndOfStream) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
