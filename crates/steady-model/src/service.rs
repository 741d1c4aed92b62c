//! Point-in-time views of services owned by a graph runtime

use crate::failure::StartFailure;
use crate::name::ServiceName;
use crate::state::{Mode, State, Substate};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one graph runtime instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuntimeId(pub Uuid);

impl RuntimeId {
    /// Fresh random id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RuntimeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable snapshot of a single service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    /// Canonical identity
    pub name: ServiceName,
    /// Runtime instance that owns the service
    pub runtime: RuntimeId,
    /// Current sub-state
    pub substate: Substate,
    /// Controller mode
    pub mode: Mode,
    /// Failure raised by the start action, if any
    pub start_failure: Option<StartFailure>,
    /// Immediate dependencies
    pub dependencies: IndexSet<ServiceName>,
    /// Immediate dependencies that are themselves unreachable
    pub immediately_unavailable: IndexSet<ServiceName>,
}

impl ServiceSnapshot {
    /// Snapshot of a freshly resolved, active service with no dependencies
    #[must_use]
    pub fn new(name: ServiceName, runtime: RuntimeId) -> Self {
        Self {
            name,
            runtime,
            substate: Substate::Down,
            mode: Mode::Active,
            start_failure: None,
            dependencies: IndexSet::new(),
            immediately_unavailable: IndexSet::new(),
        }
    }

    /// With sub-state
    #[inline]
    #[must_use]
    pub fn with_substate(mut self, substate: Substate) -> Self {
        self.substate = substate;
        self
    }

    /// With mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// With start failure (also moves the snapshot to `START_FAILED`)
    #[inline]
    #[must_use]
    pub fn with_start_failure(mut self, failure: StartFailure) -> Self {
        self.substate = Substate::StartFailed;
        self.start_failure = Some(failure);
        self
    }

    /// With an immediate dependency
    #[inline]
    #[must_use]
    pub fn with_dependency(mut self, dependency: ServiceName) -> Self {
        self.dependencies.insert(dependency);
        self
    }

    /// With an immediate dependency that is unavailable
    #[inline]
    #[must_use]
    pub fn with_unavailable(mut self, dependency: ServiceName) -> Self {
        self.dependencies.insert(dependency.clone());
        self.immediately_unavailable.insert(dependency);
        self
    }

    /// Coarse state
    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        self.substate.state()
    }

    /// Whether the service sits in the problem sub-state
    #[inline]
    #[must_use]
    pub fn is_problem(&self) -> bool {
        self.substate == Substate::Problem
    }
}

/// Name → status row as exposed by a runtime status query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Canonical name
    pub name: String,
    /// Upper-case state name
    pub state: String,
    /// Canonical names of immediate dependencies
    pub dependencies: Vec<String>,
}

impl From<&ServiceSnapshot> for ServiceStatus {
    fn from(snapshot: &ServiceSnapshot) -> Self {
        Self {
            name: snapshot.name.canonical_name(),
            state: snapshot.state().name().to_string(),
            dependencies: snapshot
                .dependencies
                .iter()
                .map(ServiceName::canonical_name)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_unavailable_is_also_a_dependency() {
        let snap = ServiceSnapshot::new(ServiceName::of(&["svc", "a"]), RuntimeId::new())
            .with_unavailable(ServiceName::of(&["svc", "missing"]));
        assert!(snap.dependencies.contains(&ServiceName::of(&["svc", "missing"])));
        assert_eq!(snap.immediately_unavailable.len(), 1);
    }

    #[test]
    fn start_failure_moves_to_failed() {
        let snap = ServiceSnapshot::new(ServiceName::of(&["svc", "a"]), RuntimeId::new())
            .with_start_failure(StartFailure::new("E"));
        assert_eq!(snap.state(), State::Failed);
        assert!(!snap.is_problem());
    }

    #[test]
    fn status_from_snapshot() {
        let snap = ServiceSnapshot::new(ServiceName::of(&["svc", "a"]), RuntimeId::new())
            .with_substate(Substate::Up)
            .with_dependency(ServiceName::of(&["svc", "b"]));
        let status = ServiceStatus::from(&snap);
        assert_eq!(status.name, "svc.a");
        assert_eq!(status.state, "UP");
        assert_eq!(status.dependencies, vec!["svc.b"]);
    }
}
