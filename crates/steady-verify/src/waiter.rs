//! Stability waiter
//!
//! Wraps a [`StabilitySource`] so that one operation waits at a time and its
//! registered interest is always released afterwards.

use crate::error::VerifyError;
use parking_lot::Mutex;
use steady_model::{QuiescenceResult, ServiceName, StabilitySource};
use tokio_util::sync::CancellationToken;

/// Clears the source's interest when dropped, including during unwinding
struct InterestGuard<'a, S: StabilitySource> {
    source: &'a S,
}

impl<S: StabilitySource> Drop for InterestGuard<'_, S> {
    fn drop(&mut self) {
        self.source.clear_interest();
        tracing::trace!("stability interest cleared");
    }
}

/// Blocks until the services touched by an operation stop changing
#[derive(Debug)]
pub struct StabilityWaiter<S> {
    source: S,
    op_lock: Mutex<()>,
}

impl<S: StabilitySource> StabilityWaiter<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            op_lock: Mutex::new(()),
        }
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Register a service touched by the current operation
    pub fn register(&self, service: &ServiceName) {
        tracing::debug!(service = %service, "registering stability interest");
        self.source.register_interest(service);
    }

    /// Wait for quiescence of everything registered so far
    ///
    /// Concurrent calls on the same waiter are serialized. Interest is
    /// cleared on every exit path.
    ///
    /// # Errors
    /// Returns [`VerifyError::Cancelled`] if `cancel` fires first
    pub fn await_stability(&self, cancel: &CancellationToken) -> Result<QuiescenceResult, VerifyError> {
        let _op = self.op_lock.lock();
        let _interest = InterestGuard {
            source: &self.source,
        };

        tracing::debug!("waiting for stability");
        match self.source.await_stability(cancel) {
            Ok(result) => {
                tracing::debug!(
                    failed = result.failed_count(),
                    problems = result.problem_count(),
                    "stability reached"
                );
                Ok(result)
            }
            Err(err) => {
                tracing::warn!(error = %err, "stability wait cancelled");
                Err(err.into())
            }
        }
    }
}
