//! Verification step run after an operation mutates the service graph

use crate::diagnose::ServiceDiagnoser;
use crate::operation::{FailureDescription, OperationContext, OPERATION_CANCELLED};
use crate::waiter::StabilityWaiter;
use steady_model::{RuntimeRegistry, ServiceName, StabilitySource};
use tokio_util::sync::CancellationToken;

/// Result of one verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every touched service reached its target state
    Stable,
    /// Services failed or are blocked; a report is attached
    Failed,
    /// The wait was cancelled; no report was built
    Cancelled,
}

/// Waits for stability and attaches a diagnostic report on failure
#[derive(Debug)]
pub struct ServiceVerifier<S, R> {
    waiter: StabilityWaiter<S>,
    diagnoser: ServiceDiagnoser<R>,
}

impl<S: StabilitySource, R: RuntimeRegistry> ServiceVerifier<S, R> {
    pub fn new(source: S, registry: R) -> Self {
        Self {
            waiter: StabilityWaiter::new(source),
            diagnoser: ServiceDiagnoser::new(registry),
        }
    }

    #[inline]
    pub fn waiter(&self) -> &StabilityWaiter<S> {
        &self.waiter
    }

    #[inline]
    pub fn diagnoser(&self) -> &ServiceDiagnoser<R> {
        &self.diagnoser
    }

    /// Register a service touched by the operation
    pub fn register(&self, service: &ServiceName) {
        self.waiter.register(service);
    }

    /// Wait, classify and record the outcome on `ctx`
    pub fn execute(&self, ctx: &mut OperationContext, cancel: &CancellationToken) -> Outcome {
        let result = match self.waiter.await_stability(cancel) {
            Ok(result) => result,
            // Cancellation is the only way the wait can fail.
            Err(_) => {
                ctx.set_failure_description(FailureDescription::Cancelled(
                    OPERATION_CANCELLED.to_string(),
                ));
                ctx.set_rollback_only();
                return Outcome::Cancelled;
            }
        };

        let report = self.diagnoser.diagnose(&result);
        if report.is_empty() {
            return Outcome::Stable;
        }

        tracing::info!(
            failed = report.failed_services().len(),
            missing_required = report.missing_required_services().len(),
            missing_dependencies = report.services_missing_dependencies().len(),
            transitive = report.transitive_problem().is_some(),
            "services did not reach a stable state"
        );
        ctx.set_failure_description(FailureDescription::Report(report));
        if ctx.is_rollback_on_runtime_failure() {
            ctx.set_rollback_only();
        }
        Outcome::Failed
    }
}
