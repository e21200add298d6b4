//! Clock and template rendering
//!
//! Everything here is a pure function of its arguments; the only source of
//! "now" is the [`Clock`] handed to the logger.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local, NaiveDate, Utc};

use super::level::LogLevel;

pub const DATE_PLACEHOLDER: &str = "%DATE%";
pub const TIME_PLACEHOLDER: &str = "%TIME%";
pub const DATETIME_PLACEHOLDER: &str = "%DATETIME%";
pub const LEVEL_PLACEHOLDER: &str = "%LEVEL%";
pub const MESSAGE_PLACEHOLDER: &str = "%MESSAGE%";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to, for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn format_with(now: DateTime<Utc>, use_server_time: bool, fmt: &str) -> String {
    if use_server_time {
        now.with_timezone(&Local).format(fmt).to_string()
    } else {
        now.format(fmt).to_string()
    }
}

/// Calendar day of `now` in the selected time source
pub fn day_of(now: DateTime<Utc>, use_server_time: bool) -> NaiveDate {
    if use_server_time {
        now.with_timezone(&Local).date_naive()
    } else {
        now.date_naive()
    }
}

/// `YYYY-MM-DD`
pub fn format_date(now: DateTime<Utc>, use_server_time: bool) -> String {
    format_with(now, use_server_time, DATE_FORMAT)
}

/// `HH:MM:SS`
pub fn format_time(now: DateTime<Utc>, use_server_time: bool) -> String {
    format_with(now, use_server_time, TIME_FORMAT)
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn format_datetime(now: DateTime<Utc>, use_server_time: bool) -> String {
    format_with(now, use_server_time, DATETIME_FORMAT)
}

/// Values substituted into an entry or banner template
#[derive(Debug, Clone, Default)]
pub struct Placeholders<'a> {
    pub date: String,
    pub time: String,
    pub datetime: String,
    pub level: Option<LogLevel>,
    pub message: Option<&'a str>,
}

impl<'a> Placeholders<'a> {
    /// Placeholders for the given instant, without level or message
    pub fn at(now: DateTime<Utc>, use_server_time: bool) -> Self {
        Self {
            date: format_date(now, use_server_time),
            time: format_time(now, use_server_time),
            datetime: format_datetime(now, use_server_time),
            level: None,
            message: None,
        }
    }

    pub fn with_entry(mut self, level: LogLevel, message: &'a str) -> Self {
        self.level = Some(level);
        self.message = Some(message);
        self
    }
}

/// Substitute placeholders in `template`
///
/// `%DATETIME%` goes before `%DATE%`/`%TIME%` and the message goes in last,
/// so neither a longer placeholder nor message text is ever re-expanded.
/// Placeholders without a value are left as written.
pub fn render(template: &str, values: &Placeholders<'_>) -> String {
    let mut out = template
        .replace(DATETIME_PLACEHOLDER, &values.datetime)
        .replace(DATE_PLACEHOLDER, &values.date)
        .replace(TIME_PLACEHOLDER, &values.time);
    if let Some(level) = values.level {
        out = out.replace(LEVEL_PLACEHOLDER, level.as_str());
    }
    if let Some(message) = values.message {
        out = out.replace(MESSAGE_PLACEHOLDER, message);
    }
    out
}

/// Remove newline, carriage return and tab characters
pub fn sanitize_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Resolve a file name format against a calendar day
pub fn resolve_file_name(format: &str, date: NaiveDate) -> String {
    format.replace(DATE_PLACEHOLDER, &date.format(DATE_FORMAT).to_string())
}
