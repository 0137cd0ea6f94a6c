use crate::core::dispatch::ServiceName;
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::services::{Service, ServiceState};

/// Keeps every routed entry for later rendering.
pub struct StoreService;

impl Service for StoreService {
    fn name(&self) -> ServiceName {
        ServiceName::Store
    }

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        state.store.push(entry.clone());
        Ok(())
    }
}
