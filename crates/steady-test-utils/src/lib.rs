//! Testing utilities for the steady workspace
//!
//! Static runtimes, canned stability sources and snapshot builders.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::time::Duration;
use steady_model::{
    QuiescenceResult, RuntimeId, RuntimeRegistry, ServiceName, ServiceSnapshot,
    ServiceStatus, StabilitySource, StartFailure, StatusQuery, Substate, UnitProblemSource,
    WaitError,
};
use tokio_util::sync::CancellationToken;

pub fn name(canonical: &str) -> ServiceName {
    ServiceName::parse(canonical).unwrap()
}

/// Service whose start action threw `message`
pub fn failed(runtime: RuntimeId, service: &str, message: &str) -> ServiceSnapshot {
    ServiceSnapshot::new(name(service), runtime).with_start_failure(StartFailure::new(message))
}

/// Problem service with the given immediately unavailable dependencies
pub fn problem(runtime: RuntimeId, service: &str, missing: &[&str]) -> ServiceSnapshot {
    missing.iter().fold(
        ServiceSnapshot::new(name(service), runtime).with_substate(Substate::Problem),
        |s, m| s.with_unavailable(name(m)),
    )
}

/// Problem service blocked only through `via`
pub fn blocked(runtime: RuntimeId, service: &str, via: &str) -> ServiceSnapshot {
    ServiceSnapshot::new(name(service), runtime)
        .with_substate(Substate::Problem)
        .with_dependency(name(via))
}

pub fn up(runtime: RuntimeId, service: &str) -> ServiceSnapshot {
    ServiceSnapshot::new(name(service), runtime).with_substate(Substate::Up)
}

/// Fixed set of services belonging to one runtime
#[derive(Debug, Clone)]
pub struct StaticRuntime {
    id: RuntimeId,
    services: Vec<ServiceSnapshot>,
}

impl StaticRuntime {
    pub fn new() -> Self {
        Self {
            id: RuntimeId::new(),
            services: Vec::new(),
        }
    }

    pub fn id(&self) -> RuntimeId {
        self.id
    }

    /// Add a snapshot; its runtime id is rewritten to this runtime's
    pub fn with(mut self, mut snapshot: ServiceSnapshot) -> Self {
        snapshot.runtime = self.id;
        self.services.push(snapshot);
        self
    }

    pub fn get(&self, service: &str) -> ServiceSnapshot {
        let wanted = name(service);
        self.services
            .iter()
            .find(|s| s.name == wanted)
            .cloned()
            .unwrap()
    }

    /// Capture failed and problem services the way a runtime would
    pub fn quiescence(&self) -> QuiescenceResult {
        QuiescenceResult::partition(self.services.iter().cloned())
    }
}

impl Default for StaticRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeRegistry for StaticRuntime {
    fn services(&self, runtime: RuntimeId) -> Option<Vec<ServiceSnapshot>> {
        (runtime == self.id).then(|| self.services.clone())
    }
}

impl StatusQuery for StaticRuntime {
    fn query_statuses(&self) -> Vec<ServiceStatus> {
        self.services.iter().map(ServiceStatus::from).collect()
    }
}

impl UnitProblemSource for StaticRuntime {
    fn problems_for_unit(&self, unit: &ServiceName) -> Option<Vec<ServiceSnapshot>> {
        let owned: Vec<&ServiceSnapshot> = self
            .services
            .iter()
            .filter(|s| unit.is_prefix_of(&s.name))
            .collect();
        if owned.is_empty() {
            return None;
        }
        Some(
            owned
                .into_iter()
                .filter(|s| matches!(s.substate, Substate::StartFailed | Substate::Problem))
                .cloned()
                .collect(),
        )
    }
}

/// Status listing that counts how often it was queried
#[derive(Debug, Default)]
pub struct CountingStatuses {
    pub rows: Vec<ServiceStatus>,
    pub queries: Mutex<usize>,
}

impl CountingStatuses {
    pub fn new(rows: Vec<ServiceStatus>) -> Self {
        Self {
            rows,
            queries: Mutex::new(0),
        }
    }

    pub fn query_count(&self) -> usize {
        *self.queries.lock()
    }
}

impl StatusQuery for CountingStatuses {
    fn query_statuses(&self) -> Vec<ServiceStatus> {
        *self.queries.lock() += 1;
        self.rows.clone()
    }
}

/// Stability source returning a fixed result
///
/// A blocking source never settles on its own and only returns once its
/// token is cancelled.
#[derive(Debug, Default)]
pub struct CannedSource {
    result: QuiescenceResult,
    blocking: bool,
    interest: Mutex<Vec<ServiceName>>,
    clears: Mutex<usize>,
}

impl CannedSource {
    pub fn new(result: QuiescenceResult) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }

    pub fn blocking() -> Self {
        Self {
            blocking: true,
            ..Self::default()
        }
    }

    pub fn interest(&self) -> Vec<ServiceName> {
        self.interest.lock().clone()
    }

    pub fn clear_count(&self) -> usize {
        *self.clears.lock()
    }
}

impl StabilitySource for CannedSource {
    fn register_interest(&self, service: &ServiceName) {
        self.interest.lock().push(service.clone());
    }

    fn await_stability(&self, cancel: &CancellationToken) -> Result<QuiescenceResult, WaitError> {
        if self.blocking {
            while !cancel.is_cancelled() {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        Ok(self.result.clone())
    }

    fn clear_interest(&self) {
        self.interest.lock().clear();
        *self.clears.lock() += 1;
    }
}
