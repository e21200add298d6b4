//! Errors raised inside the logger
//!
//! None of these cross the public `bool` contract; they are reported through
//! `tracing` and converted to `false` at the entry points.

use std::path::PathBuf;

/// Failure while touching the log directory or files
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start timer runtime: {0}")]
    Timers(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LoggerError>;
