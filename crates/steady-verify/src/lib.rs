//! Steady Verify
//!
//! Decides whether a service graph settled after an operation and explains
//! why when it did not.
//!
//! # Pipeline
//!
//! 1. [`StabilityWaiter`] blocks until every touched service stops changing
//! 2. [`ServiceDiagnoser`] classifies the failed and blocked services into a
//!    [`DiagnosticReport`]
//! 3. [`ServiceVerifier`] attaches the report to the [`OperationContext`] and
//!    applies the rollback policy
//! 4. Separately, per composite unit, [`UnitDependencyHandler`] logs which
//!    sibling unit a failed unit was waiting for
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//! use steady_verify::{OperationContext, Outcome, ServiceVerifier, VerifyConfig};
//!
//! let verifier = ServiceVerifier::new(container.monitor(), &container);
//! verifier.register(&touched);
//!
//! let mut ctx = OperationContext::new(&VerifyConfig::default());
//! if verifier.execute(&mut ctx, &CancellationToken::new()) == Outcome::Failed {
//!     println!("{}", ctx.report().unwrap());
//! }
//! ```

#![allow(missing_docs)]

mod diagnose;
mod error;
mod operation;
mod report;
mod unit;
mod verifier;
mod waiter;

pub use diagnose::{
    describe_failures, missing_dependency_lines, missing_required, missing_transitive,
    ServiceDiagnoser,
};
pub use error::VerifyError;
pub use operation::{FailureDescription, OperationContext, VerifyConfig, OPERATION_CANCELLED};
pub use report::{DiagnosticReport, TransitiveDependencyProblem};
pub use unit::{
    parse_unit_name, InterUnitDependency, UnitDependencyHandler, UnitDiagnoser, UnitName,
    UnitNaming, DEPLOYMENT_TARGET, MISSING_STATE,
};
pub use verifier::{Outcome, ServiceVerifier};
pub use waiter::StabilityWaiter;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
