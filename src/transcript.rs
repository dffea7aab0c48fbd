//! Transcript buffer
//!
//! The ordered list of display lines. Lines are appended during normal
//! operation; `clear` and `replace` start a new revision so renderers know
//! to redraw instead of appending.

use std::collections::VecDeque;

/// Ordered display lines with an optional retention cap
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: VecDeque<String>,
    /// Maximum retained lines; `0` keeps everything
    max_lines: usize,
    /// Bumped whenever existing lines are removed or replaced wholesale
    revision: u64,
    /// Lines evicted by the cap since the last revision bump
    evicted: usize,
}

impl Transcript {
    /// Unbounded transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript retaining at most `max_lines` (`0` = unbounded)
    pub fn with_capacity_limit(max_lines: usize) -> Self {
        Self {
            max_lines,
            ..Self::default()
        }
    }

    /// Append one line
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        self.enforce_limit();
    }

    /// Append lines in order
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.lines.push_back(line.into());
        }
        self.enforce_limit();
    }

    /// Remove every line
    pub fn clear(&mut self) {
        self.lines.clear();
        self.bump_revision();
    }

    /// Replace the whole transcript
    pub fn replace<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.clear();
        self.bump_revision();
        self.extend(lines);
    }

    /// Iterate over the retained lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Retained lines as an owned vector
    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    /// Last retained line
    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Current revision. Changes on `clear` and `replace`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total lines appended in the current revision, including evicted ones.
    ///
    /// Renderers use this as a monotonic cursor within a revision.
    pub fn appended_in_revision(&self) -> usize {
        self.evicted + self.lines.len()
    }

    /// Lines appended after `cursor` (as returned by [`appended_in_revision`])
    ///
    /// [`appended_in_revision`]: Transcript::appended_in_revision
    pub fn lines_since(&self, cursor: usize) -> impl Iterator<Item = &str> {
        let skip = cursor.saturating_sub(self.evicted);
        self.lines.iter().skip(skip).map(String::as_str)
    }

    fn bump_revision(&mut self) {
        self.revision += 1;
        self.evicted = 0;
    }

    fn enforce_limit(&mut self) {
        if self.max_lines == 0 {
            return;
        }
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
            self.evicted += 1;
        }
    }
}
