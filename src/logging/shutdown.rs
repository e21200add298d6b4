//! Process shutdown hooks
//!
//! Interrupt and terminate signals (via `ctrlc`) finalize every registered
//! logger and exit. Panics are logged at CRITICAL and flushed; a panic on the
//! main thread also finalizes, since the process is about to end. The panic
//! hook never exits itself, so panics caught with `catch_unwind` or isolated
//! by a runtime stay recoverable. Hooks are installed once per process, the
//! first time a logger with `install_process_hooks` starts. Normal exit is
//! covered by dropping the last `Logger` handle.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, Once, OnceLock, PoisonError, Weak};

use tracing::{info, warn};

use super::logger::{Logger, Shared};

/// Exit status after an interrupt or terminate signal
pub const SIGNAL_EXIT_CODE: i32 = 130;

static REGISTRY: OnceLock<Mutex<Vec<Weak<Shared>>>> = OnceLock::new();
static INSTALL: Once = Once::new();

fn registry() -> &'static Mutex<Vec<Weak<Shared>>> {
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

/// Loggers that are still alive, collected without holding the registry lock
fn live_loggers() -> Vec<Arc<Shared>> {
    let mut entries = registry().lock().unwrap_or_else(PoisonError::into_inner);
    entries.retain(|weak| weak.strong_count() > 0);
    entries.iter().filter_map(Weak::upgrade).collect()
}

/// Track `shared` for finalization and install the hooks if needed
pub(crate) fn register(shared: &Arc<Shared>) {
    if shared.hooks_registered.swap(true, Ordering::SeqCst) {
        return;
    }
    {
        let mut entries = registry().lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|weak| weak.strong_count() > 0);
        entries.push(Arc::downgrade(shared));
    }
    INSTALL.call_once(install_hooks);
}

fn install_hooks() {
    if let Err(e) = ctrlc::set_handler(|| {
        finalize_all();
        std::process::exit(SIGNAL_EXIT_CODE);
    }) {
        warn!("Could not install interrupt handler: {}", e);
    }

    install_panic_hook();
    info!("Installed logger shutdown hooks");
}

/// Chain a hook that records panics before the previous hook runs
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let payload = panic
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.payload().downcast_ref::<String>().cloned());
        let message = panic_message(payload.as_deref(), panic.location().map(|l| l.to_string()));
        let on_main = std::thread::current().name() == Some("main");
        record_panic(&live_loggers(), &message, on_main);
        previous(panic);
    }));
}

/// Write `message` at CRITICAL to each logger, stopping them when `finalize`
fn record_panic(loggers: &[Arc<Shared>], message: &str, finalize: bool) -> usize {
    loggers
        .iter()
        .filter(|shared| shared.record_fault(message, finalize))
        .count()
}

fn panic_message(payload: Option<&str>, location: Option<String>) -> String {
    let payload = payload.unwrap_or("unknown panic");
    match location {
        Some(location) => format!("Panic at {}: {}", location, payload),
        None => format!("Panic: {}", payload),
    }
}

/// Flush and stop every registered logger
///
/// Call this before `std::process::exit`, which skips destructors. Returns
/// how many loggers were stopped cleanly.
pub fn finalize_all() -> usize {
    live_loggers()
        .into_iter()
        .map(|shared| Logger::from_shared(shared).stop())
        .filter(|stopped| *stopped)
        .count()
}
