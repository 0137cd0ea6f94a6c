//! Routes the `log` crate facade into a shared logger.
//!
//! `error!`/`warn!` become Important entries, everything else plain Log
//! entries. Other threads wait for the logger. Records emitted from inside
//! the logger on the same thread (a service that itself logs) are dropped.

use crate::core::engine::Logger;
use crate::core::host::SharedLogger;
use crate::core::level::Prefix;
use std::cell::Cell;

thread_local! {
    static IN_BRIDGE: Cell<bool> = const { Cell::new(false) };
}

pub struct LogBridge {
    logger: SharedLogger,
    max: log::LevelFilter,
}

impl LogBridge {
    pub fn new(logger: SharedLogger, max: log::LevelFilter) -> Self {
        LogBridge { logger, max }
    }

    pub fn prefix_for(level: log::Level) -> Prefix {
        match level {
            log::Level::Error | log::Level::Warn => Prefix::Important,
            log::Level::Info | log::Level::Debug | log::Level::Trace => Prefix::None,
        }
    }

    /// Run `f` with the logger locked, unless this thread is already inside it.
    fn with_logger(&self, f: impl FnOnce(&mut Logger)) {
        if IN_BRIDGE.with(|busy| busy.replace(true)) {
            return;
        }
        let mut guard = match self.logger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
        drop(guard);
        IN_BRIDGE.with(|busy| busy.set(false));
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.max
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("[{}] {}", record.target(), record.args());
        let prefix = Self::prefix_for(record.level());
        self.with_logger(|logger| {
            let _ = logger.log_kind(prefix, &message, None);
        });
    }

    fn flush(&self) {
        self.with_logger(|logger| {
            let _ = logger.flush();
        });
    }
}

/// Install the bridge as the global `log` backend.
pub fn init_log_bridge(logger: SharedLogger, max: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(LogBridge::new(logger, max)))?;
    log::set_max_level(max);
    Ok(())
}
