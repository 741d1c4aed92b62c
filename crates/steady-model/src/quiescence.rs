//! The failed/problem split captured when a graph stops changing

use crate::name::ServiceName;
use crate::service::ServiceSnapshot;
use crate::state::Substate;
use indexmap::IndexMap;

/// Services that did not reach their target state, captured at quiescence
///
/// `failed` holds services whose own start action threw; `problem` holds
/// services blocked by an unavailable dependency. The two never overlap.
/// Iteration follows capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuiescenceResult {
    failed: IndexMap<ServiceName, ServiceSnapshot>,
    problem: IndexMap<ServiceName, ServiceSnapshot>,
}

impl QuiescenceResult {
    /// Result with no failures
    #[inline]
    #[must_use]
    pub fn stable() -> Self {
        Self::default()
    }

    /// Build from the two captured sets
    ///
    /// # Errors
    /// Returns [`QuiescenceError::Overlap`] if a service appears in both sets
    pub fn new(
        failed: impl IntoIterator<Item = ServiceSnapshot>,
        problem: impl IntoIterator<Item = ServiceSnapshot>,
    ) -> Result<Self, QuiescenceError> {
        let failed: IndexMap<_, _> = failed.into_iter().map(|s| (s.name.clone(), s)).collect();
        let mut problems = IndexMap::new();
        for snapshot in problem {
            if failed.contains_key(&snapshot.name) {
                return Err(QuiescenceError::Overlap(snapshot.name));
            }
            problems.insert(snapshot.name.clone(), snapshot);
        }
        Ok(Self {
            failed,
            problem: problems,
        })
    }

    /// Split snapshots by sub-state: `START_FAILED` → failed, `PROBLEM` →
    /// problem, everything else is dropped
    #[must_use]
    pub fn partition(snapshots: impl IntoIterator<Item = ServiceSnapshot>) -> Self {
        let mut result = Self::default();
        for snapshot in snapshots {
            match snapshot.substate {
                Substate::StartFailed => {
                    result.failed.insert(snapshot.name.clone(), snapshot);
                }
                Substate::Problem => {
                    result.problem.insert(snapshot.name.clone(), snapshot);
                }
                _ => {}
            }
        }
        result
    }

    /// Services whose start action threw
    #[inline]
    pub fn failed(&self) -> impl Iterator<Item = &ServiceSnapshot> {
        self.failed.values()
    }

    /// Services blocked by an unavailable dependency
    #[inline]
    pub fn problems(&self) -> impl Iterator<Item = &ServiceSnapshot> {
        self.problem.values()
    }

    /// Number of failed services
    #[inline]
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of problem services
    #[inline]
    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.problem.len()
    }

    /// True when nothing failed and nothing is blocked
    #[inline]
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.failed.is_empty() && self.problem.is_empty()
    }

    /// Whether `name` is in either set
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &ServiceName) -> bool {
        self.failed.contains_key(name) || self.problem.contains_key(name)
    }
}

/// Errors building a [`QuiescenceResult`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuiescenceError {
    /// Service classified as both failed and problem
    #[error("service {0} is both failed and blocked")]
    Overlap(ServiceName),
}
