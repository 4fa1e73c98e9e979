//! Document: the ordered row store plus file load/save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::row::Row;
use crate::error::Error;

/// An ordered sequence of rows with a dirty counter and optional
/// filename. Row order is line order is file order.
///
/// The dirty counter increments on every content mutation and resets to
/// zero on successful load or save; nonzero means unsaved changes.
#[derive(Debug, Default)]
pub struct Document {
    rows: Vec<Row>,
    dirty: u64,
    filename: Option<PathBuf>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a file, one row per line, stripping trailing CR/LF.
    /// A missing or unreadable file is an error; the caller treats it
    /// as fatal at startup.
    pub fn open(path: &Path, tab_stop: usize) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let rows = contents
            .lines()
            .map(|line| Row::new(line, tab_stop))
            .collect();
        Ok(Self {
            rows,
            dirty: 0,
            filename: Some(path.to_path_buf()),
        })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dirty(&self) -> u64 {
        self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, path: PathBuf) {
        self.filename = Some(path);
    }

    /// Insert a row at `at`; an index past the end is a no-op.
    pub fn insert_row(&mut self, at: usize, text: impl Into<String>, tab_stop: usize) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(text, tab_stop));
        self.dirty += 1;
    }

    /// Delete the row at `at`; out-of-range is a no-op.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Insert one character at `(cy, cx)`. Typing at the line past the
    /// last row appends a new empty row first.
    pub fn insert_char(&mut self, cy: usize, cx: usize, ch: char, tab_stop: usize) {
        if cy > self.rows.len() {
            return;
        }
        if cy == self.rows.len() {
            self.rows.push(Row::new("", tab_stop));
        }
        self.rows[cy].insert_char(cx, ch, tab_stop);
        self.dirty += 1;
    }

    /// Delete the character at `(cy, cx)`; out-of-range is a no-op.
    pub fn delete_char(&mut self, cy: usize, cx: usize, tab_stop: usize) -> bool {
        let Some(row) = self.rows.get_mut(cy) else {
            return false;
        };
        if row.delete_char(cx, tab_stop) {
            self.dirty += 1;
            true
        } else {
            false
        }
    }

    /// Split the row at `(cy, cx)`: the suffix becomes a new row below.
    pub fn split_line(&mut self, cy: usize, cx: usize, tab_stop: usize) {
        let Some(row) = self.rows.get_mut(cy) else {
            return;
        };
        let tail = row.split_off(cx, tab_stop);
        self.rows.insert(cy + 1, Row::new(tail, tab_stop));
        self.dirty += 1;
    }

    /// Append row `src`'s content onto row `dst`, then remove `src`
    /// (backspace at the start of a line merges it into the one above).
    pub fn merge_rows(&mut self, dst: usize, src: usize, tab_stop: usize) {
        if dst == src || dst >= self.rows.len() || src >= self.rows.len() {
            return;
        }
        let moved = self.rows.remove(src);
        let dst = if src < dst { dst - 1 } else { dst };
        self.rows[dst].append(moved.chars(), tab_stop);
        self.dirty += 1;
    }

    /// Serialize every row followed by a newline — the inverse of `open`.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(row.chars());
            out.push('\n');
        }
        out
    }

    /// Write the serialized document to the current filename,
    /// truncating to the exact new length. Resets the dirty counter and
    /// returns the byte count on success.
    pub fn save(&mut self) -> io::Result<usize> {
        let path = self
            .filename
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no filename set"))?;
        let data = self.serialize();
        fs::write(&path, &data)?;
        self.dirty = 0;
        Ok(data.len())
    }
}
