//! daylog - buffered logging to date-named files with daily rollover
//!
//! ```no_run
//! use daylog::{LogLevel, Logger, LoggerConfig};
//!
//! let logger = Logger::new(LoggerConfig::default());
//! logger.start();
//! logger.log("service ready", LogLevel::Info);
//! logger.stop();
//! ```

pub mod config;
pub mod logging;

pub use config::LoggerConfig;
pub use logging::{LogArg, LogLevel, Logger};
