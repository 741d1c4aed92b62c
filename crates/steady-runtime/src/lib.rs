//! Steady Runtime
//!
//! In-memory service graph used to exercise and demonstrate stability
//! verification. Callers drive each service through its lifecycle; the
//! container validates transitions, marks services blocked by unavailable or
//! failed dependencies as `PROBLEM`, and wakes stability monitors on every
//! change.
//!
//! # Example
//!
//! ```rust,ignore
//! use steady_model::StabilitySource;
//! use tokio_util::sync::CancellationToken;
//! use steady_runtime::{ServiceContainer, ServiceSpec};
//!
//! let container = ServiceContainer::new();
//! container.install(ServiceSpec::new(name.clone()).with_dependency(dep))?;
//!
//! let monitor = container.monitor();
//! monitor.register_interest(&name);
//! let result = monitor.await_stability(&CancellationToken::new())?;
//! ```

#![allow(missing_docs)]

mod container;
mod error;
mod monitor;
mod registry;
mod resolve;
mod snapshot;
mod transition;

pub use container::{ServiceContainer, ServiceSpec};
pub use error::RuntimeError;
pub use monitor::StabilityMonitor;
pub use registry::ContainerRegistry;
pub use snapshot::{RuntimeSnapshot, ServiceEntry, SnapshotState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
