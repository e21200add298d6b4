//! Buffered-write and rollover state machine
//!
//! `LoggerState` owns the mutable logger fields and performs every file
//! transition. It never looks at the clock itself; callers pass `now`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use super::buffer::EntryBuffer;
use super::error::Result;
use super::file_writer::{append_text, ensure_directory, file_exists, file_len, terminate_line};
use super::level::LogLevel;
use super::template::{day_of, render, resolve_file_name, sanitize_message, Placeholders};
use crate::config::LoggerConfig;

#[derive(Debug)]
pub struct LoggerState {
    config: LoggerConfig,
    /// Last day observed in the configured time source
    current_date: Option<NaiveDate>,
    /// Active file; `Some` exactly while started
    current_file: Option<PathBuf>,
    /// File active immediately before the last rollover
    previous_file: Option<PathBuf>,
    buffer: EntryBuffer,
    started: bool,
    /// Current file already carries its end banner from a rollover that has
    /// not managed to open the next file yet
    sealed: bool,
    /// Entries dropped while the file could not be written, not yet reported
    dropped: usize,
    /// Bumped on every start so stale timer ticks can be told apart
    epoch: u64,
}

impl LoggerState {
    pub fn new(config: LoggerConfig, now: DateTime<Utc>) -> Self {
        Self {
            config,
            current_date: None,
            current_file: None,
            previous_file: None,
            buffer: EntryBuffer::new(now),
            started: false,
            sealed: false,
            dropped: 0,
            epoch: 0,
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LoggerConfig {
        &mut self.config
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_date
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn previous_file(&self) -> Option<&Path> {
        self.previous_file.as_deref()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Entries dropped since the last call because writes kept failing
    pub fn take_dropped(&mut self) -> usize {
        std::mem::take(&mut self.dropped)
    }

    /// Whether entries at `level` pass the threshold
    pub fn accepts(&self, level: LogLevel) -> bool {
        level >= self.config.log_level
    }

    fn banner(&self, template: &str, now: DateTime<Utc>) -> String {
        let values = Placeholders::at(now, self.config.use_server_time);
        terminate_line(&render(template, &values))
    }

    fn resolve_path(&self, date: NaiveDate) -> PathBuf {
        self.config
            .log_directory
            .join(resolve_file_name(&self.config.file_name_format, date))
    }

    /// Create the directory and file, writing the start banner
    ///
    /// Returns whether the log file is present afterwards. Calling this on a
    /// started state does no I/O.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if let Some(path) = self.current_file.as_deref().filter(|_| self.started) {
            return Ok(file_exists(path));
        }

        ensure_directory(&self.config.log_directory)?;
        let date = day_of(now, self.config.use_server_time);
        let path = self.resolve_path(date);
        append_text(&path, &self.banner(&self.config.start_banner, now))?;

        self.current_date = Some(date);
        self.current_file = Some(path);
        self.started = true;
        self.sealed = false;
        self.epoch += 1;
        self.buffer.reset_clock(now);

        Ok(self.current_file.as_deref().is_some_and(file_exists))
    }

    /// Flush, seal the current file with the end banner and mark stopped
    ///
    /// Returns the number of buffered entries dropped because the directory
    /// or file disappeared underneath the logger. On a write failure the
    /// logger is still marked stopped and unwritten lines stay buffered.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<usize> {
        if !self.started {
            return Ok(0);
        }
        self.started = false;
        let Some(path) = self.current_file.take() else {
            return Ok(0);
        };

        let dir_present = path.parent().map_or(true, Path::is_dir);
        if !dir_present || !file_exists(&path) {
            return Ok(self.buffer.discard());
        }

        self.write_buffer(&path, now)?;
        if !std::mem::take(&mut self.sealed) {
            append_text(&path, &self.banner(&self.config.end_banner, now))?;
        }
        Ok(0)
    }

    /// Format an entry line for `message` at `level`
    pub fn format_entry(&self, level: LogLevel, message: &str, now: DateTime<Utc>) -> String {
        let message = sanitize_message(message);
        let values =
            Placeholders::at(now, self.config.use_server_time).with_entry(level, &message);
        render(&self.config.entry_template, &values)
    }

    /// Buffer a formatted line, returning whether an eager flush is due
    pub fn append(&mut self, line: String, now: DateTime<Utc>) -> bool {
        self.buffer.push(line);
        self.buffer.should_flush(&self.config.flush_caps(), now)
    }

    /// Write all buffered lines to the current file in one append
    pub fn flush(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.current_file.clone() {
            Some(path) => self.write_buffer(&path, now),
            None => Ok(()),
        }
    }

    /// Append the buffer as one block
    ///
    /// On failure, lines that did reach the file are forgotten so a retry
    /// does not repeat them, and the rest is trimmed to the entry cap,
    /// oldest first.
    fn write_buffer(&mut self, path: &Path, now: DateTime<Utc>) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let before = file_len(path).unwrap_or(0);
        if let Err(e) = append_text(path, &self.buffer.joined()) {
            if let Some(after) = file_len(path) {
                self.buffer.drop_written(after.saturating_sub(before));
            }
            let cap = self.config.flush_caps().max_entries.max(1);
            self.dropped += self.buffer.retain_newest(cap);
            return Err(e);
        }
        self.buffer.mark_flushed(now);
        Ok(())
    }

    /// Track the current day and switch files when it changed
    ///
    /// Returns whether a new file was opened. The date is recorded even when
    /// rollover is disabled; only the file switch is skipped. A switch that
    /// fails leaves the old date in place so the next check tries again,
    /// without sealing the old file twice.
    pub fn check_rollover(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let today = day_of(now, self.config.use_server_time);
        if self.current_date == Some(today) {
            return Ok(false);
        }

        let Some(old_path) = self
            .current_file
            .clone()
            .filter(|_| self.started && self.config.rollover_enabled)
        else {
            self.current_date = Some(today);
            return Ok(false);
        };

        if !self.sealed {
            // Everything buffered so far belongs to the old day
            self.write_buffer(&old_path, now)?;
            append_text(&old_path, &self.banner(&self.config.end_banner, now))?;
            self.sealed = true;
        }

        ensure_directory(&self.config.log_directory)?;
        let new_path = self.resolve_path(today);
        append_text(&new_path, &self.banner(&self.config.start_banner, now))?;

        self.previous_file = self.current_file.replace(new_path);
        self.current_date = Some(today);
        self.sealed = false;
        self.flush(now)?;
        Ok(true)
    }
}
