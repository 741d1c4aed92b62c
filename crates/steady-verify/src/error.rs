//! Error types for verification

use steady_model::ServiceName;

/// Verification errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// The stability wait was cancelled before quiescence
    #[error("operation cancelled while waiting for stability")]
    Cancelled,

    /// No service is installed under the composite unit
    #[error("unknown unit: {0}")]
    UnknownUnit(ServiceName),
}

impl From<steady_model::WaitError> for VerifyError {
    fn from(err: steady_model::WaitError) -> Self {
        match err {
            steady_model::WaitError::Cancelled => VerifyError::Cancelled,
        }
    }
}
