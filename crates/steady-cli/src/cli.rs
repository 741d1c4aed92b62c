//! CLI type definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use steady_model::ServiceName;

#[derive(Debug, Parser)]
#[command(name = "steady")]
#[command(about = "Verify service graph stability and explain failures", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Default log level; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Verify a runtime snapshot and print the diagnostic report
    Verify(VerifyArgs),

    /// Explain which sibling unit a composite unit is waiting for
    Units(UnitsArgs),
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Snapshot file (.json, otherwise YAML)
    pub snapshot: PathBuf,

    /// Services touched by the operation (default: every service)
    #[arg(long = "touched", value_name = "NAME")]
    pub touched: Vec<ServiceName>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Do not mark the operation rollback-only on failure
    #[arg(long)]
    pub no_rollback: bool,
}

#[derive(Debug, Args)]
pub struct UnitsArgs {
    /// Snapshot file (.json, otherwise YAML)
    pub snapshot: PathBuf,

    /// Composite unit service name, e.g. deployment.subunit.app1
    #[arg(long)]
    pub unit: ServiceName,

    /// Namespace under which unit services live
    #[arg(long, default_value = "deployment.subunit")]
    pub namespace: String,

    #[arg(long, default_value = "INSTALL")]
    pub install_suffix: String,

    #[arg(long, default_value = "deploymentCompleteService")]
    pub completion_suffix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}
