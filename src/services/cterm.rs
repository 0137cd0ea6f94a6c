use crate::core::dispatch::ServiceName;
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::core::level::Level;
use crate::services::{Service, ServiceState};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Colour terminal output, one line per entry.
pub struct CtermService;

pub fn paint(entry: &Entry) -> ColoredString {
    let line = entry.text();
    match entry.level {
        Level::FinishFatal => line.bright_red().bold(),
        Level::Important => line.red().bold(),
        Level::FinishNatural | Level::FinishRedirect => line.bright_yellow(),
        Level::Stack => line.cyan(),
        Level::Log | Level::Disable => line.normal(),
    }
}

impl Service for CtermService {
    fn name(&self) -> ServiceName {
        ServiceName::Cterm
    }

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        writeln!(state.stdout, "{}", paint(entry))?;
        Ok(())
    }
}
