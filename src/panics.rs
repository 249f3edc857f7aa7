//! Panic capture for unit isolation
//!
//! Unit stages and constructors run under `catch_unwind`, which only yields
//! the panic payload. A process-wide hook records where the panic happened
//! (and a backtrace when `RUST_BACKTRACE` enables one) in a thread-local
//! slot, so the caught panic can be logged with its origin.

use anyhow::anyhow;
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::sync::Once;

struct PanicSite {
    location: Option<String>,
    backtrace: Backtrace,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Installs the recording hook (once per process) and clears this thread's slot
///
/// The previous hook still runs, so stderr output is unchanged.
pub(crate) fn arm() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let site = PanicSite {
                location: info.location().map(|l| l.to_string()),
                backtrace: Backtrace::capture(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(site));
            previous(info);
        }));
    });
    LAST_PANIC.with(|slot| slot.borrow_mut().take());
}

/// Extracts the message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Builds an error from a caught panic, with the recorded site when there is one
pub(crate) fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = panic_message(payload);
    let site = LAST_PANIC.with(|slot| slot.borrow_mut().take());

    match site {
        Some(PanicSite {
            location,
            backtrace,
        }) => {
            let location = location.unwrap_or_else(|| "unknown location".to_string());
            if backtrace.status() == BacktraceStatus::Captured {
                anyhow!("panicked at {}: {}\nstack backtrace:\n{}", location, message, backtrace)
            } else {
                anyhow!("panicked at {}: {}", location, message)
            }
        }
        None => anyhow!("panicked: {}", message),
    }
}
