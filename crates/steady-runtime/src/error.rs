//! Error types for the in-memory runtime

use steady_model::{ServiceName, Substate};

/// Runtime errors
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No service installed under this name
    #[error("service not found: {0}")]
    UnknownService(ServiceName),

    /// A service with this name is already installed
    #[error("duplicate service: {0}")]
    DuplicateService(ServiceName),

    /// Transition not allowed from the current sub-state
    #[error("illegal transition for {name}: {from} -> {to}")]
    IllegalTransition {
        name: ServiceName,
        from: Substate,
        to: Substate,
    },

    /// Start requested while some dependency is not up
    #[error("dependencies of {name} are not up: {pending:?}")]
    DependenciesNotSatisfied {
        name: ServiceName,
        pending: Vec<ServiceName>,
    },

    /// Snapshot file could not be read
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot JSON could not be decoded
    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot YAML could not be decoded
    #[error("invalid YAML snapshot: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
