//! Service container
//!
//! Owns every installed service, its sub-state and its dependency edges.
//! Transitions are driven by callers (the component that runs start actions);
//! the container only validates them, re-resolves dormant services, and wakes
//! anyone waiting for stability.

use crate::error::RuntimeError;
use crate::monitor::StabilityMonitor;
use crate::resolve::{resolve, Services};
use crate::transition::validate_transition;
use indexmap::IndexSet;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use steady_model::{
    Mode, RuntimeId, RuntimeRegistry, ServiceName, ServiceSnapshot, ServiceStatus, StartFailure,
    StatusQuery, Substate, UnitProblemSource,
};

/// Installation request for a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: ServiceName,
    pub mode: Mode,
    pub dependencies: IndexSet<ServiceName>,
}

impl ServiceSpec {
    /// Active service with no dependencies
    #[must_use]
    pub fn new(name: ServiceName) -> Self {
        Self {
            name,
            mode: Mode::Active,
            dependencies: IndexSet::new(),
        }
    }

    /// With mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// With an immediate dependency
    #[inline]
    #[must_use]
    pub fn with_dependency(mut self, dependency: ServiceName) -> Self {
        self.dependencies.insert(dependency);
        self
    }
}

/// Service entry in the container
#[derive(Debug, Clone)]
pub(crate) struct ServiceRecord {
    pub(crate) name: ServiceName,
    pub(crate) mode: Mode,
    pub(crate) substate: Substate,
    pub(crate) dependencies: IndexSet<ServiceName>,
    pub(crate) unavailable: IndexSet<ServiceName>,
    pub(crate) start_failure: Option<StartFailure>,
}

impl ServiceRecord {
    pub(crate) fn new(name: ServiceName, mode: Mode, dependencies: IndexSet<ServiceName>) -> Self {
        Self {
            name,
            mode,
            substate: Substate::New,
            dependencies,
            unavailable: IndexSet::new(),
            start_failure: None,
        }
    }

    pub(crate) fn snapshot(&self, runtime: RuntimeId) -> ServiceSnapshot {
        ServiceSnapshot {
            name: self.name.clone(),
            runtime,
            substate: self.substate,
            mode: self.mode,
            start_failure: self.start_failure.clone(),
            dependencies: self.dependencies.clone(),
            immediately_unavailable: self.unavailable.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) id: RuntimeId,
    pub(crate) services: Mutex<Services>,
    pub(crate) changed: Condvar,
}

/// Handle to an in-memory service graph
///
/// Cloning yields another handle to the same graph.
#[derive(Debug, Clone)]
pub struct ServiceContainer {
    pub(crate) shared: Arc<Shared>,
}

impl ServiceContainer {
    /// Create empty container with a fresh [`RuntimeId`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                id: RuntimeId::new(),
                services: Mutex::new(Services::new()),
                changed: Condvar::new(),
            }),
        }
    }

    /// Identity of this runtime instance
    #[inline]
    #[must_use]
    pub fn id(&self) -> RuntimeId {
        self.shared.id
    }

    /// Number of installed services
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.services.lock().len()
    }

    /// Whether nothing is installed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.services.lock().is_empty()
    }

    /// New stability monitor with its own, empty interest set
    #[must_use]
    pub fn monitor(&self) -> StabilityMonitor {
        StabilityMonitor::new(self.clone())
    }

    /// Install a service
    pub fn install(&self, spec: ServiceSpec) -> Result<(), RuntimeError> {
        self.mutate(|services| {
            if services.contains_key(&spec.name) {
                return Err(RuntimeError::DuplicateService(spec.name));
            }
            tracing::debug!(service = %spec.name, mode = %spec.mode, "installing service");
            let record = ServiceRecord::new(spec.name.clone(), spec.mode, spec.dependencies);
            services.insert(spec.name, record);
            Ok(())
        })
    }

    /// Begin the start action: `DOWN` → `STARTING`
    pub fn start(&self, name: &ServiceName) -> Result<(), RuntimeError> {
        self.mutate(|services| {
            let record = services
                .get(name)
                .ok_or_else(|| RuntimeError::UnknownService(name.clone()))?;
            validate_transition(name, record.substate, Substate::Starting)?;
            let pending: Vec<ServiceName> = record
                .dependencies
                .iter()
                .filter(|dep| services.get(*dep).map(|d| d.substate) != Some(Substate::Up))
                .cloned()
                .collect();
            if !pending.is_empty() {
                return Err(RuntimeError::DependenciesNotSatisfied {
                    name: name.clone(),
                    pending,
                });
            }
            move_to(services, name, Substate::Starting)?;
            Ok(())
        })
    }

    /// Start action completed: `STARTING` → `UP`
    pub fn started(&self, name: &ServiceName) -> Result<(), RuntimeError> {
        self.mutate(|services| move_to(services, name, Substate::Up).map(|_| ()))
    }

    /// Start action threw: `STARTING` → `START_FAILED`
    pub fn fail(&self, name: &ServiceName, failure: StartFailure) -> Result<(), RuntimeError> {
        self.mutate(|services| {
            let record = move_to(services, name, Substate::StartFailed)?;
            tracing::debug!(service = %name, failure = %failure.message, "start failed");
            record.start_failure = Some(failure);
            Ok(())
        })
    }

    /// Clear a start failure: `START_FAILED` → `DOWN`
    pub fn retry(&self, name: &ServiceName) -> Result<(), RuntimeError> {
        self.mutate(|services| {
            let record = move_to(services, name, Substate::Down)?;
            record.start_failure = None;
            Ok(())
        })
    }

    /// Stop a running service: `UP` → `DOWN`
    pub fn stop(&self, name: &ServiceName) -> Result<(), RuntimeError> {
        self.mutate(|services| move_to(services, name, Substate::Down).map(|_| ()))
    }

    /// Begin removal: → `REMOVING`, mode `REMOVE`
    pub fn remove(&self, name: &ServiceName) -> Result<(), RuntimeError> {
        self.mutate(|services| {
            let record = move_to(services, name, Substate::Removing)?;
            record.mode = Mode::Remove;
            Ok(())
        })
    }

    /// Finish removal: `REMOVING` → `REMOVED`, dropping the service
    pub fn removed(&self, name: &ServiceName) -> Result<(), RuntimeError> {
        self.mutate(|services| {
            move_to(services, name, Substate::Removed)?;
            services.shift_remove(name);
            Ok(())
        })
    }

    /// Change the controller mode
    pub fn set_mode(&self, name: &ServiceName, mode: Mode) -> Result<(), RuntimeError> {
        self.mutate(|services| {
            let record = services
                .get_mut(name)
                .ok_or_else(|| RuntimeError::UnknownService(name.clone()))?;
            tracing::debug!(service = %name, from = %record.mode, to = %mode, "mode change");
            record.mode = mode;
            Ok(())
        })
    }

    /// Snapshot of one service
    #[must_use]
    pub fn service(&self, name: &ServiceName) -> Option<ServiceSnapshot> {
        self.shared
            .services
            .lock()
            .get(name)
            .map(|r| r.snapshot(self.shared.id))
    }

    /// Snapshot of every installed service, in installation order
    #[must_use]
    pub fn snapshot(&self) -> Vec<ServiceSnapshot> {
        self.shared
            .services
            .lock()
            .values()
            .map(|r| r.snapshot(self.shared.id))
            .collect()
    }

    /// Apply `f` under the lock, re-resolve and wake waiters
    pub(crate) fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Services) -> Result<R, RuntimeError>,
    ) -> Result<R, RuntimeError> {
        let mut services = self.shared.services.lock();
        let out = f(&mut services)?;
        resolve(&mut services);
        drop(services);
        self.shared.changed.notify_all();
        Ok(out)
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

fn move_to<'a>(
    services: &'a mut Services,
    name: &ServiceName,
    to: Substate,
) -> Result<&'a mut ServiceRecord, RuntimeError> {
    let record = services
        .get_mut(name)
        .ok_or_else(|| RuntimeError::UnknownService(name.clone()))?;
    validate_transition(name, record.substate, to)?;
    tracing::debug!(service = %name, from = %record.substate, to = %to, "transition");
    record.substate = to;
    Ok(record)
}

impl RuntimeRegistry for ServiceContainer {
    fn services(&self, runtime: RuntimeId) -> Option<Vec<ServiceSnapshot>> {
        (runtime == self.shared.id).then(|| self.snapshot())
    }
}

impl StatusQuery for ServiceContainer {
    fn query_statuses(&self) -> Vec<ServiceStatus> {
        self.snapshot().iter().map(ServiceStatus::from).collect()
    }
}

impl UnitProblemSource for ServiceContainer {
    fn problems_for_unit(&self, unit: &ServiceName) -> Option<Vec<ServiceSnapshot>> {
        let services = self.shared.services.lock();
        let mut known = false;
        let mut problems = Vec::new();
        for record in services.values().filter(|r| unit.is_prefix_of(&r.name)) {
            known = true;
            if matches!(record.substate, Substate::StartFailed | Substate::Problem) {
                problems.push(record.snapshot(self.shared.id));
            }
        }
        known.then_some(problems)
    }
}
