//! Periodic flush and rollover triggers
//!
//! Both triggers run on a small runtime owned by the started logger. They
//! hold only a weak handle, so a dropped logger ends them on the next tick.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::error::{LoggerError, Result};
use super::logger::Shared;

/// Which periodic job a trigger performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Flush,
    Rollover,
}

impl Trigger {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Trigger::Flush => "flush",
            Trigger::Rollover => "rollover",
        }
    }
}

/// Armed triggers; dropping this disarms them
pub(crate) struct Timers {
    runtime: Option<Runtime>,
    handles: Vec<JoinHandle<()>>,
}

impl Timers {
    /// Arm the flush trigger and, when `rollover_every` is set, the rollover trigger
    pub(crate) fn arm(
        shared: Weak<Shared>,
        epoch: u64,
        flush_every: Duration,
        rollover_every: Option<Duration>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("daylog-timers")
            .enable_time()
            .build()
            .map_err(LoggerError::Timers)?;

        let mut handles = vec![runtime.spawn(run_trigger(
            shared.clone(),
            epoch,
            flush_every,
            Trigger::Flush,
        ))];
        if let Some(period) = rollover_every {
            handles.push(runtime.spawn(run_trigger(shared, epoch, period, Trigger::Rollover)));
        }

        Ok(Self {
            runtime: Some(runtime),
            handles,
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
        // May run on the timer worker itself when it held the last handle
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn run_trigger(shared: Weak<Shared>, epoch: u64, period: Duration, trigger: Trigger) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let Some(logger) = shared.upgrade() else {
            break;
        };
        if !logger.on_trigger(epoch, trigger) {
            break;
        }
    }
}
