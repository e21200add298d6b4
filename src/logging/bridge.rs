//! Route `tracing` output into the daily log files
//!
//! `Logger` implements `MakeWriter`, so it can be handed to a
//! `tracing_subscriber::fmt` layer. Each formatted line is parsed back into a
//! level and message and logged like any other entry.

use std::cell::Cell;
use std::io::Write;

use tracing_subscriber::fmt::MakeWriter;

use super::level::LogLevel;
use super::logger::Logger;

thread_local! {
    /// Set while a bridged line is being logged on this thread
    static IN_BRIDGE: Cell<bool> = const { Cell::new(false) };
}

/// Writer handed out to the tracing formatter
pub struct BridgeWriter {
    logger: Logger,
}

impl Write for BridgeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines() {
            let Some((level, message)) = parse_log_line(line) else {
                continue;
            };
            // Diagnostics the logger emits about its own failures would
            // otherwise loop straight back into it. The bridge also never
            // starts or restarts the logger by itself.
            if IN_BRIDGE.with(Cell::get) || !self.logger.is_started() {
                eprintln!("{}", line.trim());
                continue;
            }
            IN_BRIDGE.with(|flag| flag.set(true));
            self.logger.log(message, level);
            IN_BRIDGE.with(|flag| flag.set(false));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Logger {
    type Writer = BridgeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BridgeWriter {
            logger: self.clone(),
        }
    }
}

/// Split a formatted tracing line into level and message
///
/// Accepts `[timestamp] LEVEL rest`; without a recognizable level the whole
/// line is treated as INFO.
pub fn parse_log_line(line: &str) -> Option<(LogLevel, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut rest = line;
    for _ in 0..2 {
        let (token, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if let Some(level) = tracing_level(token) {
            return Some((level, tail.trim_start()));
        }
        rest = tail.trim_start();
        if rest.is_empty() {
            break;
        }
    }
    Some((LogLevel::Info, line))
}

fn tracing_level(token: &str) -> Option<LogLevel> {
    match token {
        "TRACE" => Some(LogLevel::from(tracing::Level::TRACE)),
        "DEBUG" => Some(LogLevel::from(tracing::Level::DEBUG)),
        "INFO" => Some(LogLevel::from(tracing::Level::INFO)),
        "WARN" => Some(LogLevel::from(tracing::Level::WARN)),
        "ERROR" => Some(LogLevel::from(tracing::Level::ERROR)),
        _ => None,
    }
}
