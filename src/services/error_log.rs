use crate::core::dispatch::ServiceName;
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::services::{Service, ServiceState};
use std::io::Write;

pub const ERROR_LOG_TAG: &str = "[artful-debug]";

/// Tagged line to the error-log destination (stderr unless configured).
pub struct ErrorLogService;

impl Service for ErrorLogService {
    fn name(&self) -> ServiceName {
        ServiceName::ErrorLog
    }

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        writeln!(state.error_log, "{} {}", ERROR_LOG_TAG, entry.text())?;
        Ok(())
    }
}

pub struct StderrService;

impl Service for StderrService {
    fn name(&self) -> ServiceName {
        ServiceName::Stderr
    }

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        writeln!(state.stderr, "{}", entry.text())?;
        Ok(())
    }
}
