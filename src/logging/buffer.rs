//! In-memory entry buffer
//!
//! Holds formatted lines until they are appended to the current log file.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Thresholds that trigger an eager flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushCaps {
    /// Flush once the buffered byte estimate reaches this
    pub max_bytes: usize,
    /// Flush once this many entries are buffered
    pub max_entries: usize,
    /// Flush once this much time passed since the last flush
    pub interval: Duration,
}

/// Ordered buffer of formatted log lines
#[derive(Debug)]
pub struct EntryBuffer {
    /// Lines awaiting write, in write order
    lines: Vec<String>,
    /// Running sum of buffered line lengths
    byte_estimate: usize,
    /// When the buffer was last written out
    last_flush: DateTime<Utc>,
}

impl EntryBuffer {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            lines: Vec::new(),
            byte_estimate: 0,
            last_flush: now,
        }
    }

    /// Append a formatted line
    pub fn push(&mut self, line: String) {
        self.byte_estimate += line.len();
        self.lines.push(line);
    }

    /// Check whether any flush threshold has been reached
    pub fn should_flush(&self, caps: &FlushCaps, now: DateTime<Utc>) -> bool {
        if self.lines.is_empty() {
            return false;
        }
        let elapsed = (now - self.last_flush).to_std().unwrap_or(Duration::ZERO);
        self.byte_estimate >= caps.max_bytes
            || self.lines.len() >= caps.max_entries
            || elapsed >= caps.interval
    }

    /// Render the buffered lines as one newline-terminated block
    ///
    /// The buffer is left untouched; call [`EntryBuffer::mark_flushed`] once
    /// the block is on disk.
    pub fn joined(&self) -> String {
        let mut block = self.lines.join("\n");
        block.push('\n');
        block
    }

    /// Clear the buffer after a successful write
    pub fn mark_flushed(&mut self, now: DateTime<Utc>) {
        self.lines.clear();
        self.byte_estimate = 0;
        self.last_flush = now;
    }

    /// Drop buffered lines without writing them, returning how many were lost
    pub fn discard(&mut self) -> usize {
        let count = self.lines.len();
        self.lines.clear();
        self.byte_estimate = 0;
        count
    }

    /// Drop the oldest lines so at most `max` remain, returning how many went
    pub fn retain_newest(&mut self, max: usize) -> usize {
        let excess = self.lines.len().saturating_sub(max);
        for line in self.lines.drain(..excess) {
            self.byte_estimate -= line.len();
        }
        excess
    }

    /// Forget leading lines that a failed write already put on disk
    ///
    /// `written` is the number of bytes the file grew by. Only lines written
    /// out completely, newline included, are removed. Returns how many.
    pub fn drop_written(&mut self, written: u64) -> usize {
        let mut remaining = written;
        let mut complete = 0;
        for line in &self.lines {
            let size = line.len() as u64 + 1;
            if size > remaining {
                break;
            }
            remaining -= size;
            complete += 1;
        }
        for line in self.lines.drain(..complete) {
            self.byte_estimate -= line.len();
        }
        complete
    }

    /// Restart the flush interval from `now`
    pub fn reset_clock(&mut self, now: DateTime<Utc>) {
        self.last_flush = now;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn byte_estimate(&self) -> usize {
        self.byte_estimate
    }

    pub fn last_flush(&self) -> DateTime<Utc> {
        self.last_flush
    }
}
