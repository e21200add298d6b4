use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use daylog::config::{self, LoggerConfig};
use daylog::logging::help_text;
use daylog::{LogLevel, Logger};

fn main() -> Result<()> {
    let arg = std::env::args().nth(1);
    if matches!(arg.as_deref(), Some("-h") | Some("--help")) {
        println!("usage: daylog [CONFIG]\n\nLogs each stdin line at INFO.\n");
        print!("{}", help_text());
        return Ok(());
    }

    let config_path = arg
        .map(PathBuf::from)
        .unwrap_or_else(config::config_file_path);
    let config = LoggerConfig::load(&config_path)?;
    let logger = Logger::new(config);

    // Our own diagnostics go to the same daily file
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(logger.clone())
        .with_ansi(false)
        .without_time()
        .with_target(true);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "daylog=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    if !logger.start() {
        anyhow::bail!(
            "Could not open log file in {}",
            logger.log_directory().display()
        );
    }
    tracing::info!("Logging stdin to {:?}", logger.current_file_path());

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        logger.log(line, LogLevel::Info);
    }

    if !logger.stop() {
        anyhow::bail!("Failed to finalize log file");
    }
    Ok(())
}
