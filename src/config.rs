//! Configuration management for daylog

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::{FlushCaps, LogLevel};

const BANNER_RULE: &str = "------------------------------------------------------------";

/// Logger configuration
///
/// Every field can also be changed on a live logger through its setters;
/// changes apply to the next operation that reads the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Directory holding the log files (created with parents on start)
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,

    /// File name template; `%DATE%` is replaced with the current day
    #[serde(default = "default_file_name_format")]
    pub file_name_format: String,

    /// Switch to a new file when the date changes
    #[serde(default = "default_true")]
    pub rollover_enabled: bool,

    /// Entries below this level are dropped
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Mirror accepted entries to stdout
    #[serde(default)]
    pub log_to_console: bool,

    /// Template for one entry line
    #[serde(default = "default_entry_template")]
    pub entry_template: String,

    /// Written when a file becomes active
    #[serde(default = "default_start_banner")]
    pub start_banner: String,

    /// Written when a file is sealed
    #[serde(default = "default_end_banner")]
    pub end_banner: String,

    /// Local time when true, UTC otherwise
    #[serde(default = "default_true")]
    pub use_server_time: bool,

    /// Flush timer period, also the age that forces an eager flush (default: 1000ms)
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Rollover check timer period (default: 5000ms)
    #[serde(default = "default_rollover_check_interval_ms")]
    pub rollover_check_interval_ms: u64,

    /// Buffered byte estimate that forces an eager flush (default: 16 KiB)
    #[serde(default = "default_max_buffer_bytes")]
    pub max_buffer_bytes: usize,

    /// Buffered entry count that forces an eager flush (default: 1000)
    #[serde(default = "default_max_buffer_entries")]
    pub max_buffer_entries: usize,

    /// Install interrupt/terminate/panic hooks on first start
    #[serde(default = "default_true")]
    pub install_process_hooks: bool,
}

fn default_true() -> bool {
    true
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_file_name_format() -> String {
    "%DATE%.log".to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_entry_template() -> String {
    "%DATE% %TIME% | %LEVEL% | %MESSAGE%".to_string()
}

fn default_start_banner() -> String {
    format!("{BANNER_RULE}\nLog started: %DATETIME%\n{BANNER_RULE}\n")
}

fn default_end_banner() -> String {
    format!("{BANNER_RULE}\nLog ended: %DATETIME%\n{BANNER_RULE}\n")
}

fn default_flush_interval_ms() -> u64 {
    1000
}

fn default_rollover_check_interval_ms() -> u64 {
    5000
}

fn default_max_buffer_bytes() -> usize {
    16 * 1024
}

fn default_max_buffer_entries() -> usize {
    1000
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            file_name_format: default_file_name_format(),
            rollover_enabled: true,
            log_level: default_log_level(),
            log_to_console: false,
            entry_template: default_entry_template(),
            start_banner: default_start_banner(),
            end_banner: default_end_banner(),
            use_server_time: true,
            flush_interval_ms: default_flush_interval_ms(),
            rollover_check_interval_ms: default_rollover_check_interval_ms(),
            max_buffer_bytes: default_max_buffer_bytes(),
            max_buffer_entries: default_max_buffer_entries(),
            install_process_hooks: true,
        }
    }
}

impl LoggerConfig {
    /// Load configuration from a TOML file, or return default if not found
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Eager-flush thresholds derived from this configuration
    pub fn flush_caps(&self) -> FlushCaps {
        FlushCaps {
            max_bytes: self.max_buffer_bytes,
            max_entries: self.max_buffer_entries,
            interval: self.flush_interval(),
        }
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.max(1))
    }

    pub fn rollover_check_interval(&self) -> Duration {
        Duration::from_millis(self.rollover_check_interval_ms.max(1))
    }
}

/// Get the base configuration directory (<config dir>/daylog)
/// Falls back to ./.daylog if no config directory can be determined
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("daylog"))
        .unwrap_or_else(|| {
            tracing::warn!("Could not determine config directory, using current directory");
            PathBuf::from(".daylog")
        })
}

/// Get the path to the default config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
