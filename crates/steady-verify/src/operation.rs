//! Operation context and verification settings

use crate::report::DiagnosticReport;
use serde::{Deserialize, Serialize};

/// Description stored on the operation when the wait is cancelled
pub const OPERATION_CANCELLED: &str = "Operation cancelled";

/// Verification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct VerifyConfig {
    /// Mark the operation rollback-only when services fail or are blocked
    pub rollback_on_runtime_failure: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            rollback_on_runtime_failure: true,
        }
    }
}

impl VerifyConfig {
    #[must_use]
    pub fn with_rollback_on_runtime_failure(mut self, rollback: bool) -> Self {
        self.rollback_on_runtime_failure = rollback;
        self
    }
}

/// What went wrong with an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureDescription {
    /// The stability wait was cancelled
    Cancelled(String),
    /// Services failed or were blocked
    Report(DiagnosticReport),
}

/// State of one administrative operation, as seen by verification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationContext {
    rollback_on_runtime_failure: bool,
    rollback_only: bool,
    failure_description: Option<FailureDescription>,
}

impl OperationContext {
    #[must_use]
    pub fn new(config: &VerifyConfig) -> Self {
        Self {
            rollback_on_runtime_failure: config.rollback_on_runtime_failure,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn is_rollback_on_runtime_failure(&self) -> bool {
        self.rollback_on_runtime_failure
    }

    /// Request that the surrounding transaction roll back
    pub fn set_rollback_only(&mut self) {
        self.rollback_only = true;
    }

    #[inline]
    #[must_use]
    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    pub fn set_failure_description(&mut self, description: FailureDescription) {
        self.failure_description = Some(description);
    }

    #[inline]
    #[must_use]
    pub fn failure_description(&self) -> Option<&FailureDescription> {
        self.failure_description.as_ref()
    }

    /// Attached report, if verification found problems
    #[must_use]
    pub fn report(&self) -> Option<&DiagnosticReport> {
        match &self.failure_description {
            Some(FailureDescription::Report(report)) => Some(report),
            _ => None,
        }
    }
}
