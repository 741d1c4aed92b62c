//! Per-operation stability monitor
//!
//! Each monitor keeps its own interest set. Waiting blocks on the container's
//! condition variable until every interesting service, and everything it
//! transitively depends on, sits in a rest sub-state.

use crate::container::ServiceContainer;
use crate::resolve::Services;
use indexmap::IndexSet;
use parking_lot::Mutex;
use std::time::Duration;
use steady_model::{QuiescenceResult, ServiceName, StabilitySource, WaitError};
use tokio_util::sync::CancellationToken;

/// Longest a waiter sleeps before re-checking its cancellation token
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Stability source bound to one [`ServiceContainer`]
#[derive(Debug)]
pub struct StabilityMonitor {
    container: ServiceContainer,
    interest: Mutex<IndexSet<ServiceName>>,
}

impl StabilityMonitor {
    pub(crate) fn new(container: ServiceContainer) -> Self {
        Self {
            container,
            interest: Mutex::new(IndexSet::new()),
        }
    }

    /// Currently registered services, in registration order
    #[must_use]
    pub fn interest(&self) -> Vec<ServiceName> {
        self.interest.lock().iter().cloned().collect()
    }

    /// Container this monitor watches
    #[inline]
    #[must_use]
    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }
}

/// Whether `roots` and all their installed transitive dependencies are at rest
fn is_quiescent(services: &Services, roots: &[ServiceName]) -> bool {
    let mut seen: IndexSet<&ServiceName> = IndexSet::new();
    let mut stack: Vec<&ServiceName> = roots.iter().collect();
    while let Some(name) = stack.pop() {
        if !seen.insert(name) {
            continue;
        }
        let Some(record) = services.get(name) else {
            continue;
        };
        if !record.substate.is_rest_state() {
            tracing::trace!(service = %name, substate = %record.substate, "not at rest");
            return false;
        }
        stack.extend(record.dependencies.iter());
    }
    true
}

impl StabilitySource for StabilityMonitor {
    fn register_interest(&self, service: &ServiceName) {
        self.interest.lock().insert(service.clone());
    }

    fn await_stability(&self, cancel: &CancellationToken) -> Result<QuiescenceResult, WaitError> {
        let interest = self.interest();
        let shared = &self.container.shared;

        let mut services = shared.services.lock();
        loop {
            if cancel.is_cancelled() {
                tracing::debug!("stability wait cancelled");
                return Err(WaitError::Cancelled);
            }
            if is_quiescent(&services, &interest) {
                let captured = interest
                    .iter()
                    .filter_map(|name| services.get(name))
                    .map(|record| record.snapshot(shared.id));
                return Ok(QuiescenceResult::partition(captured));
            }
            shared.changed.wait_for(&mut services, CANCEL_POLL);
        }
    }

    fn clear_interest(&self) {
        self.interest.lock().clear();
    }
}
