//! Terminal rendering
//!
//! Writes the transcript to a plain text stream. New lines are appended as
//! they arrive; when the transcript starts a new revision (clear, logout,
//! eject) the screen is cleared and redrawn.

use std::io::{self, Write};

use crate::transcript::Transcript;

/// ANSI "erase display" followed by "cursor home"
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Incremental transcript writer
pub struct TerminalRenderer<W: Write> {
    out: W,
    revision: Option<u64>,
    cursor: usize,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            revision: None,
            cursor: 0,
        }
    }

    /// Bring the output up to date with `transcript`
    pub fn render(&mut self, transcript: &Transcript) -> io::Result<()> {
        let redraw = self.revision != Some(transcript.revision());

        if redraw {
            // The very first frame has nothing to wipe
            if self.revision.is_some() {
                self.out.write_all(CLEAR_SCREEN.as_bytes())?;
            }
            for line in transcript.lines() {
                writeln!(self.out, "{}", line)?;
            }
            self.revision = Some(transcript.revision());
        } else {
            for line in transcript.lines_since(self.cursor) {
                writeln!(self.out, "{}", line)?;
            }
        }

        self.cursor = transcript.appended_in_revision();
        self.out.flush()
    }

    /// Forget what has been drawn; the next render starts from scratch
    pub fn reset(&mut self) -> io::Result<()> {
        if self.revision.is_some() {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.revision = None;
        self.cursor = 0;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
