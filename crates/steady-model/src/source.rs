//! Capabilities a graph runtime exposes to the verification layer

use crate::name::ServiceName;
use crate::quiescence::QuiescenceResult;
use crate::service::{RuntimeId, ServiceSnapshot, ServiceStatus};
use tokio_util::sync::CancellationToken;

/// Something that can be waited on until a set of services stops changing
///
/// Interest is scoped to the source instance: two sources over the same
/// runtime never see each other's registrations.
pub trait StabilitySource: Send + Sync {
    /// Add a service to the watched set
    fn register_interest(&self, service: &ServiceName);

    /// Block until every watched service and its dependencies are at rest
    ///
    /// # Errors
    /// Returns [`WaitError::Cancelled`] if `cancel` fires before quiescence
    fn await_stability(&self, cancel: &CancellationToken) -> Result<QuiescenceResult, WaitError>;

    /// Forget every registered service
    fn clear_interest(&self);
}

/// Read access to every service of one or more runtime instances
pub trait RuntimeRegistry {
    /// Snapshot of all services owned by `runtime`, or `None` if unknown
    fn services(&self, runtime: RuntimeId) -> Option<Vec<ServiceSnapshot>>;
}

/// Full name → status listing of a runtime
pub trait StatusQuery {
    /// Status rows for every installed service
    fn query_statuses(&self) -> Vec<ServiceStatus>;
}

/// Problems observed inside one composite unit
pub trait UnitProblemSource {
    /// Failed and blocked services belonging to `unit`, or `None` if the
    /// unit is unknown
    fn problems_for_unit(&self, unit: &ServiceName) -> Option<Vec<ServiceSnapshot>>;
}

impl<T: RuntimeRegistry + ?Sized> RuntimeRegistry for &T {
    fn services(&self, runtime: RuntimeId) -> Option<Vec<ServiceSnapshot>> {
        (**self).services(runtime)
    }
}

impl<T: StatusQuery + ?Sized> StatusQuery for &T {
    fn query_statuses(&self) -> Vec<ServiceStatus> {
        (**self).query_statuses()
    }
}

impl<T: UnitProblemSource + ?Sized> UnitProblemSource for &T {
    fn problems_for_unit(&self, unit: &ServiceName) -> Option<Vec<ServiceSnapshot>> {
        (**self).problems_for_unit(unit)
    }
}

impl<T: StabilitySource + ?Sized> StabilitySource for std::sync::Arc<T> {
    fn register_interest(&self, service: &ServiceName) {
        (**self).register_interest(service);
    }

    fn await_stability(&self, cancel: &CancellationToken) -> Result<QuiescenceResult, WaitError> {
        (**self).await_stability(cancel)
    }

    fn clear_interest(&self) {
        (**self).clear_interest();
    }
}

/// Errors from [`StabilitySource::await_stability`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaitError {
    /// The wait was cancelled before quiescence
    #[error("wait for stability was cancelled")]
    Cancelled,
}
