//! Steady Model
//!
//! Shared vocabulary between a concurrently-mutating service graph runtime
//! and the layer that verifies and diagnoses it.
//!
//! # Core Concepts
//!
//! - [`ServiceName`]: Canonical hierarchical identity of a service
//! - [`ServiceSnapshot`]: Immutable view of one service (state, mode, edges)
//! - [`QuiescenceResult`]: Failed/problem split captured at quiescence
//! - [`StabilitySource`]: Capability to wait until watched services settle
//! - [`RuntimeRegistry`]: Read access to every service of a runtime instance
//!
//! # Example
//!
//! ```rust,ignore
//! use steady_model::StabilitySource;
//! use tokio_util::sync::CancellationToken;
//!
//! source.register_interest(&name);
//! let result = source.await_stability(&CancellationToken::new())?;
//! if !result.is_stable() {
//!     // diagnose
//! }
//! ```

#![allow(missing_docs)]

// Core modules
mod failure;
mod name;
mod quiescence;
mod service;
mod source;
mod state;

// Re-exports
pub use failure::StartFailure;
pub use name::{NameError, ServiceName};
pub use quiescence::{QuiescenceError, QuiescenceResult};
pub use service::{RuntimeId, ServiceSnapshot, ServiceStatus};
pub use source::{RuntimeRegistry, StabilitySource, StatusQuery, UnitProblemSource, WaitError};
pub use state::{Mode, State, Substate};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
