//! Host-facing error reporting: error kinds, reports forwarded by the host,
//! and the panic hook.

use crate::core::engine::Logger;
use bitflags::bitflags;
use serde_json::json;
use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub type SharedLogger = Arc<Mutex<Logger>>;

pub fn shared(logger: Logger) -> SharedLogger {
    Arc::new(Mutex::new(logger))
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ErrorMask: u32 {
        const ERROR = 1;
        const WARNING = 1 << 1;
        const NOTICE = 1 << 2;
        const DEPRECATED = 1 << 3;
        const USER_ERROR = 1 << 4;
        const USER_WARNING = 1 << 5;
        const USER_NOTICE = 1 << 6;
        const USER_DEPRECATED = 1 << 7;
    }
}

impl ErrorMask {
    /// Kinds logged and then continued from by default.
    pub fn default_ignore() -> Self {
        ErrorMask::NOTICE
            | ErrorMask::USER_NOTICE
            | ErrorMask::DEPRECATED
            | ErrorMask::USER_DEPRECATED
    }

    /// Case-insensitive lookup of one kind, e.g. `"user_warning"`.
    pub fn from_kind_name(name: &str) -> Option<Self> {
        ErrorMask::from_name(&name.trim().to_ascii_uppercase())
    }

    pub fn kind_name(self) -> &'static str {
        self.iter_names().next().map(|(name, _)| name).unwrap_or("UNKNOWN")
    }
}

/// A non-panicking error the host chose to report.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: ErrorMask,
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl ErrorReport {
    pub fn new(kind: ErrorMask, message: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        ErrorReport {
            kind,
            message: message.into(),
            file: file.into(),
            line,
        }
    }
}

/// Error-handling policy carried by a logger.
#[derive(Debug, Clone)]
pub struct ErrorPolicy {
    /// Whether the logger currently acts as the error handler.
    pub installed: bool,
    /// Kinds the host wants reported at all.
    pub reporting: ErrorMask,
    /// Reported kinds that are logged but do not end the run.
    pub ignore: ErrorMask,
    /// Forward panics to the previous hook after logging them.
    pub rethrow: bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        ErrorPolicy {
            installed: false,
            reporting: ErrorMask::all(),
            ignore: ErrorMask::default_ignore(),
            rethrow: true,
        }
    }
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

/// Route panics through the logger at the fatal level.
///
/// The first panic is logged. With `rethrow` set the previous hook then runs
/// as usual; otherwise the logger's exit outcome is applied. Later panics go
/// straight to the previous hook, as do panics raised while the logger is
/// locked.
pub fn install_panic_hook(logger: SharedLogger) {
    let previous = panic::take_hook();
    let handled = AtomicBool::new(false);
    panic::set_hook(Box::new(move |info| {
        if handled.swap(true, Ordering::SeqCst) {
            previous(info);
            return;
        }
        let Ok(mut guard) = logger.try_lock() else {
            previous(info);
            return;
        };
        let message = panic_message(info);
        let vars = info.location().map(|loc| {
            json!({ "file": loc.file(), "line": loc.line(), "column": loc.column() })
        });
        let outcome = guard.handle_panic(&message, vars);
        drop(guard);
        match outcome {
            None => previous(info),
            Some(outcome) => outcome.apply(),
        }
    }));
}
