//! Structured diagnostic report attached to a failed operation

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use steady_model::ServiceName;

/// Graph-wide missing dependencies seen beyond this operation's own failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransitiveDependencyProblem {
    /// Blocked services with no immediately unavailable dependency, sorted
    #[serde(default)]
    pub missing_transitive_dependents: BTreeSet<ServiceName>,
    /// Every missing dependency of any problem service in the affected runtimes
    #[serde(default)]
    pub missing_transitive_dependencies: BTreeSet<ServiceName>,
}

/// Report produced by the service-level diagnoser
///
/// Each section is present only when non-empty; a stable graph yields an
/// empty report, which serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiagnosticReport {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub(crate) failed_services: IndexMap<ServiceName, String>,

    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub(crate) missing_required_services: IndexSet<ServiceName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) services_missing_dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) missing_transitive_dependency_problem: Option<TransitiveDependencyProblem>,
}

impl DiagnosticReport {
    /// True when no section is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failed_services.is_empty()
            && self.missing_required_services.is_empty()
            && self.services_missing_dependencies.is_empty()
            && self.missing_transitive_dependency_problem.is_none()
    }

    /// Failed service → rendered start failure
    #[inline]
    #[must_use]
    pub fn failed_services(&self) -> &IndexMap<ServiceName, String> {
        &self.failed_services
    }

    /// Failed services plus every immediately unavailable dependency
    #[inline]
    #[must_use]
    pub fn missing_required_services(&self) -> &IndexSet<ServiceName> {
        &self.missing_required_services
    }

    /// One `"<service> is missing [..]"` line per directly blocked service
    #[inline]
    #[must_use]
    pub fn services_missing_dependencies(&self) -> &[String] {
        &self.services_missing_dependencies
    }

    #[inline]
    #[must_use]
    pub fn transitive_problem(&self) -> Option<&TransitiveDependencyProblem> {
        self.missing_transitive_dependency_problem.as_ref()
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// YAML document
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

fn join(names: impl IntoIterator<Item = impl fmt::Display>) -> String {
    names
        .into_iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.failed_services.is_empty() {
            writeln!(f, "failed-services:")?;
            for (name, failure) in &self.failed_services {
                writeln!(f, "  {name}: {failure}")?;
            }
        }
        if !self.missing_required_services.is_empty() {
            writeln!(
                f,
                "missing-required-services: [{}]",
                join(&self.missing_required_services)
            )?;
        }
        if !self.services_missing_dependencies.is_empty() {
            writeln!(f, "services-missing-dependencies:")?;
            for line in &self.services_missing_dependencies {
                writeln!(f, "  {line}")?;
            }
        }
        if let Some(problem) = &self.missing_transitive_dependency_problem {
            writeln!(f, "missing-transitive-dependency-problem:")?;
            writeln!(
                f,
                "  missing-transitive-dependents: [{}]",
                join(&problem.missing_transitive_dependents)
            )?;
            writeln!(
                f,
                "  missing-transitive-dependencies: [{}]",
                join(&problem.missing_transitive_dependencies)
            )?;
        }
        Ok(())
    }
}
