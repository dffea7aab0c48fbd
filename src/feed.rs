//! Line Feed
//!
//! Paces scripted output into the transcript one line per tick. Timed jobs
//! are queued FIFO; each job carries a completion value that is handed back
//! exactly once, on the tick that types its last line. `flush` bypasses the
//! pacing entirely.
//!
//! The feed owns no timers. The host calls [`LineFeed::tick`] on a fixed
//! interval while [`LineFeed::is_busy`] is true.

use std::collections::VecDeque;

use tracing::debug;

use crate::transcript::Transcript;

struct FeedJob<C> {
    lines: VecDeque<String>,
    on_complete: C,
}

/// Timed line queue with completion values of type `C`
pub struct LineFeed<C> {
    jobs: VecDeque<FeedJob<C>>,
}

impl<C> LineFeed<C> {
    pub fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    /// Queue `lines` for paced output; `on_complete` is returned by the tick
    /// that types the last of them. Jobs run strictly in enqueue order.
    pub fn enqueue<I, S>(&mut self, lines: I, on_complete: C)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: VecDeque<String> = lines.into_iter().map(Into::into).collect();
        debug!(
            "Line feed job queued ({} lines, {} jobs ahead)",
            lines.len(),
            self.jobs.len()
        );
        self.jobs.push_back(FeedJob { lines, on_complete });
    }

    /// Append lines immediately
    pub fn flush<I, S>(&self, transcript: &mut Transcript, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        transcript.extend(lines);
    }

    /// Type the next line of the front job.
    ///
    /// Returns the job's completion value when its last line was typed (an
    /// empty job completes on its first tick).
    pub fn tick(&mut self, transcript: &mut Transcript) -> Option<C> {
        let job = self.jobs.front_mut()?;

        if let Some(line) = job.lines.pop_front() {
            transcript.push(line);
        }

        if job.lines.is_empty() {
            return self.jobs.pop_front().map(|job| job.on_complete);
        }
        None
    }

    /// Drop every pending job without delivering completions.
    ///
    /// Returns the number of jobs dropped.
    pub fn cancel(&mut self) -> usize {
        let dropped = self.jobs.len();
        if dropped > 0 {
            debug!("Line feed cancelled ({} jobs dropped)", dropped);
        }
        self.jobs.clear();
        dropped
    }

    /// Whether any timed job is queued or running
    pub fn is_busy(&self) -> bool {
        !self.jobs.is_empty()
    }

    /// Lines still waiting to be typed across all jobs
    pub fn pending_lines(&self) -> usize {
        self.jobs.iter().map(|job| job.lines.len()).sum()
    }
}

impl<C> Default for LineFeed<C> {
    fn default() -> Self {
        Self::new()
    }
}
