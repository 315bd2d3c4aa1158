//! Category Cursor
//!
//! Sequential, forward-only reading of one category log.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PitlogError, Result};
use crate::event::{Category, Event};

/// Reads the records of one category log in write order
pub struct CategoryCursor {
    /// Session tag (for error reporting)
    tag: String,
    category: Category,
    reader: BufReader<File>,
    /// 1-based number of the last line read
    line_no: usize,
    buf: String,
}

impl CategoryCursor {
    /// Open a category log for reading
    pub fn open(path: &Path, tag: &str, category: Category) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            tag: tag.to_string(),
            category,
            reader: BufReader::new(file),
            line_no: 0,
            buf: String::new(),
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Read the next record
    ///
    /// Returns `Ok(None)` at end of file. Blank lines are skipped; a line
    /// that does not parse, or that belongs to another category, is a
    /// `MalformedRecord`.
    pub fn next_record(&mut self) -> Result<Option<Event>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim_end();
            if line.is_empty() {
                continue;
            }

            let event = Event::from_line(line).map_err(|e| self.malformed(e.to_string()))?;
            if event.category() != self.category {
                return Err(self.malformed(format!(
                    "expected {} record, found {}",
                    self.category,
                    event.category()
                )));
            }
            return Ok(Some(event));
        }
    }

    fn malformed(&self, reason: String) -> PitlogError {
        PitlogError::MalformedRecord {
            tag: self.tag.clone(),
            category: self.category.to_string(),
            line: self.line_no,
            reason,
        }
    }
}
