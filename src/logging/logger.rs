//! Public logger handle
//!
//! `Logger` is a cheap clone over shared state so timers, process hooks and
//! the tracing bridge all drive the same instance. Every entry point returns
//! `bool`; causes of failure go to `tracing` once the state lock is released.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, warn};

use super::args::{join_args, LogArg};
use super::error::Result;
use super::help::help_text;
use super::level::LogLevel;
use super::shutdown;
use super::state::LoggerState;
use super::template::{Clock, SystemClock};
use super::timers::{Timers, Trigger};
use crate::config::LoggerConfig;

struct Inner {
    core: LoggerState,
    timers: Option<Timers>,
}

pub(crate) struct Shared {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    /// Set by a start that wants process hooks; consumed after unlocking
    hooks_pending: AtomicBool,
    pub(crate) hooks_registered: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_locked(&self, inner: &mut Inner) -> Result<usize> {
        // Disarm first so no tick lands after stop returns
        inner.timers = None;
        inner.core.stop(self.clock.now())
    }

    /// Run one timer tick, returning whether the trigger should stay armed
    pub(crate) fn on_trigger(&self, epoch: u64, trigger: Trigger) -> bool {
        let (result, dropped) = {
            let mut inner = self.lock();
            if !inner.core.is_started() || inner.core.epoch() != epoch {
                return false;
            }
            let now = self.clock.now();
            let result = match trigger {
                Trigger::Flush => inner.core.flush(now),
                Trigger::Rollover => inner.core.check_rollover(now).map(|_| ()),
            };
            (result, inner.core.take_dropped())
        };
        report_dropped(dropped);
        if let Err(e) = result {
            error!(trigger = trigger.as_str(), "Scheduled {} failed: {}", trigger.as_str(), e);
        }
        true
    }

    /// Log `message` at CRITICAL, then flush or stop
    ///
    /// Used from the panic hook, where the panicking thread may itself hold
    /// the lock, so it only tries the lock for roughly half a second. With
    /// `finalize` the logger is stopped; otherwise it stays started and the
    /// entry is flushed.
    pub(crate) fn record_fault(&self, message: &str, finalize: bool) -> bool {
        for _ in 0..50 {
            let guard = match self.inner.try_lock() {
                Ok(guard) => Some(guard),
                Err(std::sync::TryLockError::Poisoned(p)) => Some(p.into_inner()),
                Err(std::sync::TryLockError::WouldBlock) => None,
            };
            if let Some(mut inner) = guard {
                let now = self.clock.now();
                if !inner.core.is_started() {
                    return false;
                }
                let line = inner.core.format_entry(LogLevel::Critical, message, now);
                inner.core.append(line, now);
                return if finalize {
                    self.stop_locked(&mut inner).is_ok()
                } else {
                    inner.core.flush(now).is_ok()
                };
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        false
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let now = self.clock.now();
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.timers = None;
        if let Err(e) = inner.core.stop(now) {
            warn!("Failed to finalize log file on drop: {}", e);
        }
    }
}

fn report_dropped(dropped: usize) {
    if dropped > 0 {
        warn!(
            dropped,
            "Log file not writable, dropped {} oldest buffered entries", dropped
        );
    }
}

/// Buffered daily file logger
///
/// Cloning yields another handle to the same logger. The last handle to go
/// away flushes and seals the current file.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
}

impl Logger {
    /// Create a stopped logger using the system clock
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a stopped logger reading time from `clock`
    pub fn with_clock(config: LoggerConfig, clock: Arc<dyn Clock>) -> Self {
        let core = LoggerState::new(config, clock.now());
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner { core, timers: None }),
                clock,
                hooks_pending: AtomicBool::new(false),
                hooks_registered: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    fn start_locked(&self, inner: &mut Inner) -> Result<bool> {
        if inner.core.is_started() {
            return inner.core.start(self.shared.clock.now());
        }

        let ready = inner.core.start(self.shared.clock.now())?;
        let config = inner.core.config();
        let flush_every = config.flush_interval();
        let rollover_every = config
            .rollover_enabled
            .then(|| config.rollover_check_interval());
        let install_hooks = config.install_process_hooks;

        match Timers::arm(
            Arc::downgrade(&self.shared),
            inner.core.epoch(),
            flush_every,
            rollover_every,
        ) {
            Ok(timers) => inner.timers = Some(timers),
            Err(e) => {
                let _ = inner.core.stop(self.shared.clock.now());
                return Err(e);
            }
        }

        if install_hooks {
            self.shared.hooks_pending.store(true, Ordering::SeqCst);
        }
        Ok(ready)
    }

    fn register_hooks_if_pending(&self) {
        if self.shared.hooks_pending.swap(false, Ordering::SeqCst) {
            shutdown::register(&self.shared);
        }
    }

    /// Create the directory and file, write the start banner and arm timers
    ///
    /// Returns whether the log file exists afterwards. A second call while
    /// started does nothing and reports the same readiness.
    pub fn start(&self) -> bool {
        let result = {
            let mut inner = self.shared.lock();
            self.start_locked(&mut inner)
        };
        self.register_hooks_if_pending();
        match result {
            Ok(ready) => ready,
            Err(e) => {
                error!("Failed to start logger: {}", e);
                false
            }
        }
    }

    /// Disarm timers, flush, write the end banner and release the file
    pub fn stop(&self) -> bool {
        let result = {
            let mut inner = self.shared.lock();
            self.shared.stop_locked(&mut inner)
        };
        match result {
            Ok(0) => true,
            Ok(dropped) => {
                warn!(
                    dropped,
                    "Log file disappeared before stop, {} buffered entries dropped", dropped
                );
                true
            }
            Err(e) => {
                error!("Failed to finalize log file: {}", e);
                false
            }
        }
    }

    /// Buffer one entry, returning the line to echo on the console, if any
    fn log_locked(
        &self,
        inner: &mut Inner,
        message: &str,
        level: LogLevel,
    ) -> Result<Option<String>> {
        if !inner.core.is_started() {
            self.start_locked(inner)?;
        }

        let now = self.shared.clock.now();
        // An entry stamped with a new day must land in that day's file
        inner.core.check_rollover(now)?;
        if !inner.core.accepts(level) {
            return Ok(None);
        }

        let line = inner.core.format_entry(level, message, now);
        let echo = inner.core.config().log_to_console.then(|| line.clone());
        if inner.core.append(line, now) {
            inner.core.flush(now)?;
        }

        inner.core.check_rollover(now)?;
        Ok(echo)
    }

    /// Buffer `message` at `level`, starting the logger on first use
    pub fn log(&self, message: impl AsRef<str>, level: LogLevel) -> bool {
        let (result, dropped) = {
            let mut inner = self.shared.lock();
            let result = self.log_locked(&mut inner, message.as_ref(), level);
            (result, inner.core.take_dropped())
        };
        self.register_hooks_if_pending();
        report_dropped(dropped);
        match result {
            Ok(echo) => {
                if let Some(line) = echo {
                    println!("{}", line);
                }
                true
            }
            Err(e) => {
                error!(level = level.as_str(), "Failed to log entry: {}", e);
                false
            }
        }
    }

    pub fn debug<I>(&self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<LogArg>,
    {
        self.log(join_args(args), LogLevel::Debug)
    }

    pub fn info<I>(&self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<LogArg>,
    {
        self.log(join_args(args), LogLevel::Info)
    }

    pub fn warning<I>(&self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<LogArg>,
    {
        self.log(join_args(args), LogLevel::Warning)
    }

    pub fn error<I>(&self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<LogArg>,
    {
        self.log(join_args(args), LogLevel::Error)
    }

    /// Log at CRITICAL and write the buffer out before returning
    pub fn critical<I>(&self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<LogArg>,
    {
        let logged = self.log(join_args(args), LogLevel::Critical);
        let flushed = self.flush_sync();
        logged && flushed
    }

    /// Write buffered entries to the current file now
    pub fn flush_sync(&self) -> bool {
        let (result, dropped) = {
            let mut inner = self.shared.lock();
            let now = self.shared.clock.now();
            let result = inner.core.flush(now);
            (result, inner.core.take_dropped())
        };
        report_dropped(dropped);
        match result {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to flush log buffer: {}", e);
                false
            }
        }
    }

    /// Print level numbering and template placeholders to stdout
    pub fn help(&self) {
        print!("{}", help_text());
    }

    pub fn is_started(&self) -> bool {
        self.shared.lock().core.is_started()
    }

    /// Path of the active log file, if started
    pub fn current_file_path(&self) -> Option<PathBuf> {
        self.shared.lock().core.current_file().map(PathBuf::from)
    }

    /// Path of the file active before the last rollover
    pub fn previous_file_path(&self) -> Option<PathBuf> {
        self.shared.lock().core.previous_file().map(PathBuf::from)
    }

    /// Number of entries waiting to be written
    pub fn buffered_entries(&self) -> usize {
        self.shared.lock().core.buffered()
    }

    /// Number of armed periodic triggers
    #[cfg(test)]
    pub(crate) fn armed_triggers(&self) -> usize {
        self.shared.lock().timers.as_ref().map_or(0, Timers::len)
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> LoggerConfig {
        self.shared.lock().core.config().clone()
    }

    fn read<T>(&self, f: impl FnOnce(&LoggerConfig) -> T) -> T {
        f(self.shared.lock().core.config())
    }

    fn update(&self, f: impl FnOnce(&mut LoggerConfig)) {
        f(self.shared.lock().core.config_mut())
    }

    pub fn log_directory(&self) -> PathBuf {
        self.read(|c| c.log_directory.clone())
    }

    /// Takes effect at the next start or rollover
    pub fn set_log_directory(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.update(|c| c.log_directory = dir);
    }

    pub fn file_name_format(&self) -> String {
        self.read(|c| c.file_name_format.clone())
    }

    /// Takes effect at the next start or rollover
    pub fn set_file_name_format(&self, format: impl Into<String>) {
        let format = format.into();
        self.update(|c| c.file_name_format = format);
    }

    pub fn log_level(&self) -> LogLevel {
        self.read(|c| c.log_level)
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.update(|c| c.log_level = level);
    }

    pub fn log_to_console(&self) -> bool {
        self.read(|c| c.log_to_console)
    }

    pub fn set_log_to_console(&self, enabled: bool) {
        self.update(|c| c.log_to_console = enabled);
    }

    pub fn entry_template(&self) -> String {
        self.read(|c| c.entry_template.clone())
    }

    pub fn set_entry_template(&self, template: impl Into<String>) {
        let template = template.into();
        self.update(|c| c.entry_template = template);
    }

    pub fn start_banner(&self) -> String {
        self.read(|c| c.start_banner.clone())
    }

    pub fn set_start_banner(&self, banner: impl Into<String>) {
        let banner = banner.into();
        self.update(|c| c.start_banner = banner);
    }

    pub fn end_banner(&self) -> String {
        self.read(|c| c.end_banner.clone())
    }

    pub fn set_end_banner(&self, banner: impl Into<String>) {
        let banner = banner.into();
        self.update(|c| c.end_banner = banner);
    }

    pub fn rollover_enabled(&self) -> bool {
        self.read(|c| c.rollover_enabled)
    }

    pub fn set_rollover_enabled(&self, enabled: bool) {
        self.update(|c| c.rollover_enabled = enabled);
    }

    pub fn use_server_time(&self) -> bool {
        self.read(|c| c.use_server_time)
    }

    pub fn set_use_server_time(&self, enabled: bool) {
        self.update(|c| c.use_server_time = enabled);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("Logger")
            .field("started", &inner.core.is_started())
            .field("current_file", &inner.core.current_file())
            .field("buffered", &inner.core.buffered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::template::ManualClock;
    use chrono::{DateTime, TimeZone, Utc};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn config(dir: &Path) -> LoggerConfig {
        LoggerConfig {
            log_directory: dir.join("logs"),
            log_level: LogLevel::Debug,
            use_server_time: false,
            install_process_hooks: false,
            ..LoggerConfig::default()
        }
    }

    fn manual_logger(dir: &Path) -> (Logger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(noon()));
        let logger = Logger::with_clock(config(dir), clock.clone());
        (logger, clock)
    }

    fn log_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir.join("logs"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_start_log_stop_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        assert!(logger.start());
        assert!(logger.log("test", LogLevel::Debug));
        assert!(logger.stop());

        let files = log_files(temp_dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("2026-03-14.log"));

        let content = fs::read_to_string(&files[0]).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[1], "Log started: 2026-03-14 12:00:00");
        assert_eq!(lines[3], "2026-03-14 12:00:00 | DEBUG | test");
        assert_eq!(lines[5], "Log ended: 2026-03-14 12:00:00");
        assert_eq!(content.matches("test").count(), 1);
    }

    #[test]
    fn test_start_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        assert!(logger.start());
        assert!(logger.start());
        logger.stop();

        let content = fs::read_to_string(&log_files(temp_dir.path())[0]).unwrap();
        assert_eq!(content.matches("Log started").count(), 1);
    }

    #[test]
    fn test_stop_twice_writes_once() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        logger.start();
        assert!(logger.stop());
        assert!(logger.stop());
        assert!(logger.current_file_path().is_none());

        let content = fs::read_to_string(&log_files(temp_dir.path())[0]).unwrap();
        assert_eq!(content.matches("Log ended").count(), 1);
    }

    #[test]
    fn test_stop_before_start_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        assert!(logger.stop());
        assert!(!temp_dir.path().join("logs").exists());
    }

    #[test]
    fn test_first_log_starts_logger() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        assert!(!logger.is_started());
        assert!(logger.info(["lazy"]));
        assert!(logger.is_started());
        assert!(logger.current_file_path().unwrap().exists());
    }

    #[test]
    fn test_threshold_filters_convenience_methods() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());
        logger.set_log_level(LogLevel::Critical);

        assert!(logger.debug(["dbg-msg"]));
        assert!(logger.info(["info-msg"]));
        assert!(logger.warning(["warn-msg"]));
        assert!(logger.error(["err-msg"]));
        assert_eq!(logger.buffered_entries(), 0);
        assert!(logger.critical(["x"]));
        logger.stop();

        let content = fs::read_to_string(&log_files(temp_dir.path())[0]).unwrap();
        for hidden in ["dbg-msg", "info-msg", "warn-msg", "err-msg"] {
            assert!(!content.contains(hidden));
        }
        assert!(content.contains("| CRITICAL | x"));
    }

    #[test]
    fn test_critical_is_on_disk_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        logger.info(["queued first"]);
        assert_eq!(logger.buffered_entries(), 1);
        assert!(logger.critical(["boom"]));
        assert_eq!(logger.buffered_entries(), 0);

        let content = fs::read_to_string(logger.current_file_path().unwrap()).unwrap();
        let first = content.find("queued first").unwrap();
        let boom = content.find("| CRITICAL | boom").unwrap();
        assert!(first < boom);
        logger.stop();
    }

    #[test]
    fn test_entry_cap_triggers_eager_flush() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = config(temp_dir.path());
        cfg.max_buffer_entries = 3;
        let logger = Logger::with_clock(cfg, Arc::new(ManualClock::new(noon())));

        logger.info(["one"]);
        logger.info(["two"]);
        assert_eq!(logger.buffered_entries(), 2);
        logger.info(["three"]);
        assert_eq!(logger.buffered_entries(), 0);

        let content = fs::read_to_string(logger.current_file_path().unwrap()).unwrap();
        assert!(content.contains("| INFO | three"));
    }

    #[test]
    fn test_elapsed_interval_triggers_eager_flush() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, clock) = manual_logger(temp_dir.path());

        logger.info(["early"]);
        assert_eq!(logger.buffered_entries(), 1);
        clock.advance(chrono::Duration::milliseconds(1500));
        logger.info(["late"]);
        assert_eq!(logger.buffered_entries(), 0);
        logger.stop();
    }

    #[test]
    fn test_rollover_between_log_calls() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, clock) = manual_logger(temp_dir.path());

        logger.info(["first entry"]);
        let old_path = logger.current_file_path().unwrap();
        clock.set(Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 1).unwrap());
        logger.info(["second entry"]);

        let new_path = logger.current_file_path().unwrap();
        assert_ne!(old_path, new_path);
        assert!(new_path.ends_with("2026-03-15.log"));
        assert_eq!(logger.previous_file_path(), Some(old_path.clone()));
        logger.stop();

        let old = fs::read_to_string(&old_path).unwrap();
        assert!(old.contains("first entry"));
        assert!(!old.contains("second entry"));
        assert!(old.contains("Log ended: 2026-03-15 00:00:01"));

        let new = fs::read_to_string(&new_path).unwrap();
        assert!(new.starts_with("----"));
        assert!(new.lines().nth(1).unwrap().starts_with("Log started: 2026-03-15"));
        assert!(new.contains("2026-03-15 00:00:01 | INFO | second entry"));
        assert!(!new.contains("first entry"));
    }

    #[test]
    fn test_filtered_call_still_rolls_over() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, clock) = manual_logger(temp_dir.path());
        logger.set_log_level(LogLevel::Error);

        logger.error(["kept"]);
        clock.set(Utc.with_ymd_and_hms(2026, 3, 15, 8, 0, 0).unwrap());
        assert!(logger.debug(["ignored"]));

        assert!(logger.previous_file_path().is_some());
        assert!(logger.current_file_path().unwrap().ends_with("2026-03-15.log"));
        logger.stop();
    }

    #[test]
    fn test_rollover_disabled_keeps_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, clock) = manual_logger(temp_dir.path());
        logger.set_rollover_enabled(false);

        logger.info(["first entry"]);
        clock.set(Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 1).unwrap());
        logger.info(["second entry"]);
        logger.stop();

        let files = log_files(temp_dir.path());
        assert_eq!(files.len(), 1);
        let content = fs::read_to_string(&files[0]).unwrap();
        assert!(content.contains("first entry"));
        assert!(content.contains("second entry"));
        assert!(logger.previous_file_path().is_none());
    }

    #[test]
    fn test_round_trip_single_line_entries() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        logger.warning(["line one\nline two\ttabbed\r"]);
        logger.stop();

        let content = fs::read_to_string(&log_files(temp_dir.path())[0]).unwrap();
        let entries: Vec<&str> = content.lines().filter(|l| l.contains(" | ")).collect();
        assert_eq!(
            entries,
            vec!["2026-03-14 12:00:00 | WARNING | line oneline twotabbed"]
        );
    }

    #[test]
    fn test_unwritable_directory_reports_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let mut cfg = config(temp_dir.path());
        cfg.log_directory = blocker.join("logs");
        let logger = Logger::with_clock(cfg, Arc::new(ManualClock::new(noon())));

        assert!(!logger.start());
        assert!(!logger.log("nowhere to go", LogLevel::Info));
        assert!(!logger.is_started());
        assert!(logger.stop());
    }

    #[test]
    fn test_failed_rollover_switches_once_file_can_be_created() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, clock) = manual_logger(temp_dir.path());
        logger.info(["day one"]);
        let old_path = logger.current_file_path().unwrap();

        let blocker = temp_dir.path().join("logs").join("2026-03-15.log");
        fs::create_dir(&blocker).unwrap();
        clock.set(Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 1).unwrap());
        assert!(!logger.info(["lost while blocked"]));
        assert_eq!(logger.current_file_path(), Some(old_path.clone()));

        fs::remove_dir(&blocker).unwrap();
        clock.set(Utc.with_ymd_and_hms(2026, 3, 15, 0, 1, 0).unwrap());
        assert!(logger.info(["day two"]));
        assert_eq!(logger.current_file_path(), Some(blocker.clone()));
        logger.stop();

        let old = fs::read_to_string(&old_path).unwrap();
        assert!(old.contains("day one"));
        assert!(!old.contains("day two"));
        assert!(fs::read_to_string(&blocker)
            .unwrap()
            .contains("2026-03-15 00:01:00 | INFO | day two"));
    }

    #[test]
    fn test_unwritable_file_keeps_buffer_bounded() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = config(temp_dir.path());
        cfg.max_buffer_entries = 10;
        let logger = Logger::with_clock(cfg, Arc::new(ManualClock::new(noon())));
        assert!(logger.start());

        let path = logger.current_file_path().unwrap();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        for i in 0..500 {
            logger.info([format!("entry {}", i)]);
        }
        assert_eq!(logger.buffered_entries(), 10);
    }

    #[test]
    fn test_byte_cap_triggers_eager_flush() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = config(temp_dir.path());
        cfg.max_buffer_bytes = 100;
        let logger = Logger::with_clock(cfg, Arc::new(ManualClock::new(noon())));

        // Each line is 59 bytes
        let message = "x".repeat(30);
        logger.info([message.as_str()]);
        assert_eq!(logger.buffered_entries(), 1);
        logger.info([message.as_str()]);
        assert_eq!(logger.buffered_entries(), 0);

        let content = fs::read_to_string(logger.current_file_path().unwrap()).unwrap();
        assert_eq!(content.matches(message.as_str()).count(), 2);
        logger.stop();
    }

    #[test]
    fn test_console_echo_follows_setting_and_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());
        let echo = |message: &str, level: LogLevel| {
            let mut inner = logger.shared.lock();
            logger.log_locked(&mut inner, message, level).unwrap()
        };

        assert_eq!(echo("quiet", LogLevel::Info), None);

        logger.set_log_to_console(true);
        assert_eq!(
            echo("loud", LogLevel::Warning),
            Some("2026-03-14 12:00:00 | WARNING | loud".to_string())
        );

        logger.set_log_level(LogLevel::Error);
        assert_eq!(echo("filtered", LogLevel::Info), None);
        assert!(logger.log("printed", LogLevel::Error));
        logger.stop();
    }

    #[test]
    fn test_stop_after_directory_removed() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        logger.info(["doomed"]);
        fs::remove_dir_all(temp_dir.path().join("logs")).unwrap();

        assert!(logger.stop());
        assert!(!logger.is_started());
    }

    #[test]
    fn test_restart_after_stop() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        logger.start();
        logger.stop();
        assert!(logger.start());
        logger.info(["after restart"]);
        logger.stop();

        let content = fs::read_to_string(&log_files(temp_dir.path())[0]).unwrap();
        assert_eq!(content.matches("Log started").count(), 2);
        assert!(content.contains("after restart"));
    }

    #[test]
    fn test_timers_armed_and_disarmed() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        logger.start();
        assert_eq!(logger.armed_triggers(), 2);
        logger.stop();
        assert_eq!(logger.armed_triggers(), 0);

        logger.set_rollover_enabled(false);
        logger.start();
        assert_eq!(logger.armed_triggers(), 1);
        logger.stop();
    }

    #[test]
    fn test_flush_timer_writes_buffer() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = config(temp_dir.path());
        cfg.flush_interval_ms = 50;
        // Manual clock never advances, so only the timer can flush
        let logger = Logger::with_clock(cfg, Arc::new(ManualClock::new(noon())));

        logger.info(["from timer"]);
        assert_eq!(logger.buffered_entries(), 1);

        let path = logger.current_file_path().unwrap();
        let mut flushed = false;
        for _ in 0..100 {
            std::thread::sleep(std::time::Duration::from_millis(20));
            if fs::read_to_string(&path).unwrap().contains("from timer") {
                flushed = true;
                break;
            }
        }
        assert!(flushed);
        logger.stop();
    }

    #[test]
    fn test_drop_finalizes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = {
            let (logger, _clock) = manual_logger(temp_dir.path());
            logger.info(["before drop"]);
            logger.current_file_path().unwrap()
        };

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("before drop"));
        assert!(content.contains("Log ended"));
    }

    #[test]
    fn test_custom_templates() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());
        logger.set_entry_template("[%LEVEL%] %MESSAGE% %UNKNOWN%");
        logger.set_start_banner("BEGIN %DATETIME%");
        logger.set_end_banner("END");
        logger.set_file_name_format("custom-%DATE%.txt");

        logger.error(log_args_helper());
        logger.stop();

        let files = log_files(temp_dir.path());
        assert!(files[0].ends_with("custom-2026-03-14.txt"));
        let content = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(
            content,
            "BEGIN 2026-03-14 12:00:00\n[ERROR] failed 3 {\"code\":7} %UNKNOWN%\nEND\n"
        );
    }

    fn log_args_helper() -> Vec<LogArg> {
        crate::log_args!["failed", 3, serde_json::json!({"code": 7})]
    }

    #[test]
    fn test_accessors_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _clock) = manual_logger(temp_dir.path());

        logger.set_log_directory(temp_dir.path().join("elsewhere"));
        logger.set_log_to_console(true);
        logger.set_use_server_time(true);
        logger.set_log_level(LogLevel::Warning);

        assert_eq!(logger.log_directory(), temp_dir.path().join("elsewhere"));
        assert!(logger.log_to_console());
        assert!(logger.use_server_time());
        assert_eq!(logger.log_level(), LogLevel::Warning);
        assert_eq!(logger.file_name_format(), "%DATE%.log");
        assert!(logger.rollover_enabled());
        assert!(logger.entry_template().contains("%MESSAGE%"));
        assert!(logger.start_banner().contains("Log started"));
        assert!(logger.end_banner().contains("Log ended"));
        assert_eq!(logger.config().log_level, LogLevel::Warning);
    }
}
