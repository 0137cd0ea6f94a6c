use crate::core::dispatch::ServiceName;
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::core::html::escape;
use crate::services::{Service, ServiceState};
use std::io::Write;

/// Plain line to stdout; wrapped in `<pre>` once HTML output is allowed.
pub struct EchoService;

impl Service for EchoService {
    fn name(&self) -> ServiceName {
        ServiceName::Echo
    }

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        if state.html_allowed {
            writeln!(state.stdout, "<pre>{}</pre>", escape(entry.text()))?;
        } else {
            writeln!(state.stdout, "{}", entry.text())?;
        }
        Ok(())
    }
}
