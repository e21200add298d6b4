//! Buffered daily file logging
//!
//! Entries are held in memory and appended to a date-named file, either by
//! a periodic flush or eagerly when the buffer grows. When the date changes
//! the current file is sealed with an end banner and a new one begins.

mod args;
mod bridge;
mod buffer;
mod error;
mod file_writer;
mod help;
mod level;
mod logger;
mod shutdown;
mod state;
mod template;
mod timers;

pub use args::{join_args, LogArg};
pub use bridge::{parse_log_line, BridgeWriter};
pub use buffer::FlushCaps;
pub use error::LoggerError;
pub use help::help_text;
pub use level::{LogLevel, UnknownLevel};
pub use logger::Logger;
pub use shutdown::{finalize_all, SIGNAL_EXIT_CODE};
pub use template::{
    day_of, format_date, format_datetime, format_time, render, resolve_file_name,
    sanitize_message, Clock, ManualClock, Placeholders, SystemClock,
};
