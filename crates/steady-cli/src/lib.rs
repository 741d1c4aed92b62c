//! Steady CLI
//!
//! Loads a runtime snapshot, restores it into an in-memory container and
//! either verifies it or diagnoses one composite unit.

#![allow(missing_docs)]

pub mod cli;
pub mod logging;

use anyhow::{Context, Result};
use cli::{Cli, Commands, ReportFormat, UnitsArgs, VerifyArgs};
use std::io::Write;
use steady_model::ServiceName;
use tokio_util::sync::CancellationToken;
use steady_runtime::{RuntimeSnapshot, ServiceContainer};
use steady_verify::{
    OperationContext, Outcome, ServiceVerifier, UnitDependencyHandler, UnitDiagnoser, UnitNaming,
    VerifyConfig,
};

/// Run a parsed command, writing results to `out`
///
/// Returns `true` when problems were found.
///
/// # Errors
/// Fails when the snapshot cannot be loaded or the unit is unknown
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<bool> {
    match &cli.command {
        Commands::Verify(args) => verify(args, out),
        Commands::Units(args) => units(args, out),
    }
}

fn restore(path: &std::path::Path) -> Result<ServiceContainer> {
    let snapshot = RuntimeSnapshot::load(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    ServiceContainer::restore(&snapshot).context("failed to restore snapshot")
}

/// Verify the touched services of a snapshot
pub fn verify(args: &VerifyArgs, out: &mut impl Write) -> Result<bool> {
    let container = restore(&args.snapshot)?;
    let touched: Vec<ServiceName> = if args.touched.is_empty() {
        container.snapshot().into_iter().map(|s| s.name).collect()
    } else {
        args.touched.clone()
    };

    let verifier = ServiceVerifier::new(container.monitor(), &container);
    for name in &touched {
        verifier.register(name);
    }

    let config = VerifyConfig::default().with_rollback_on_runtime_failure(!args.no_rollback);
    let mut ctx = OperationContext::new(&config);
    let outcome = verifier.execute(&mut ctx, &CancellationToken::new());
    tracing::info!(?outcome, touched = touched.len(), "verification finished");

    let report = ctx.report().cloned().unwrap_or_default();
    match args.format {
        ReportFormat::Json => writeln!(out, "{}", report.to_json_pretty()?)?,
        ReportFormat::Yaml => write!(out, "{}", report.to_yaml()?)?,
        ReportFormat::Text if report.is_empty() => writeln!(out, "stable")?,
        ReportFormat::Text => {
            write!(out, "{report}")?;
            if ctx.is_rollback_only() {
                writeln!(out, "rollback: required")?;
            }
        }
    }
    Ok(outcome != Outcome::Stable)
}

/// Diagnose one composite unit of a snapshot
pub fn units(args: &UnitsArgs, out: &mut impl Write) -> Result<bool> {
    let container = restore(&args.snapshot)?;
    let naming = UnitNaming::default()
        .with_namespace(&args.namespace)
        .with_install_suffix(&args.install_suffix)
        .with_completion_suffix(&args.completion_suffix);

    let diagnoser = UnitDiagnoser::new(&container, naming);
    let found = UnitDependencyHandler::new(args.unit.clone()).execute(&container, &diagnoser)?;
    for dependency in &found {
        writeln!(out, "{dependency}")?;
    }
    Ok(!found.is_empty())
}
