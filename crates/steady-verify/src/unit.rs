//! Unit-level diagnosis
//!
//! A composite unit (a sub-deployment) is installed by a service named
//! `<namespace>.<unit>.<install suffix>` and announces completion through
//! `<namespace>.<unit>.<completion suffix>`. When an install service of one
//! unit is stuck on the completion marker of a sibling that never came up,
//! the operator is told which sibling to look at.

use crate::error::VerifyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use steady_model::{ServiceName, ServiceSnapshot, ServiceStatus, State, StatusQuery, UnitProblemSource};

/// Log target for unit diagnostics
pub const DEPLOYMENT_TARGET: &str = "steady::deployment";

/// State reported for a dependency with no status row
pub const MISSING_STATE: &str = "MISSING";

/// Naming convention for composite-unit services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UnitNaming {
    pub namespace: String,
    pub install_suffix: String,
    pub completion_suffix: String,
}

impl Default for UnitNaming {
    fn default() -> Self {
        Self {
            namespace: "deployment.subunit".to_string(),
            install_suffix: "INSTALL".to_string(),
            completion_suffix: "deploymentCompleteService".to_string(),
        }
    }
}

impl UnitNaming {
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_install_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.install_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_completion_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.completion_suffix = suffix.into();
        self
    }

    /// Install-phase service of some unit in the namespace
    #[must_use]
    pub fn is_install_service(&self, canonical: &str) -> bool {
        canonical.starts_with(&self.namespace) && canonical.ends_with(&self.install_suffix)
    }

    /// Completion marker that is not up
    #[must_use]
    pub fn is_incomplete_marker(&self, canonical: &str, state: &str) -> bool {
        state != State::Up.name() && canonical.ends_with(&self.completion_suffix)
    }

    /// Unit owning an install service
    #[must_use]
    pub fn dependent_unit(&self, canonical: &str) -> UnitName {
        parse_unit_name(canonical, &self.namespace, &self.install_suffix)
    }

    /// Unit owning a completion marker
    #[must_use]
    pub fn dependency_unit(&self, canonical: &str) -> UnitName {
        parse_unit_name(canonical, &self.namespace, &self.completion_suffix)
    }
}

/// Unit identifier parsed out of a service name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitName {
    Named(String),
    /// The service name did not follow the convention; holds it verbatim
    Unparseable(String),
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitName::Named(name) => f.write_str(name),
            UnitName::Unparseable(raw) => write!(f, "<unparseable:{raw}>"),
        }
    }
}

/// Strip `<namespace>.` and `.<suffix>` from a canonical name
///
/// Anything that does not fit, or leaves nothing between the two, yields
/// [`UnitName::Unparseable`].
#[must_use]
pub fn parse_unit_name(canonical: &str, namespace: &str, suffix: &str) -> UnitName {
    canonical
        .strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|rest| rest.strip_suffix(suffix))
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|unit| !unit.is_empty())
        .map_or_else(
            || UnitName::Unparseable(canonical.to_string()),
            |unit| UnitName::Named(unit.to_string()),
        )
}

/// One unit blocked on an incomplete sibling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterUnitDependency {
    pub dependent: UnitName,
    pub dependent_state: String,
    pub dependency: UnitName,
    pub dependency_state: String,
}

impl fmt::Display for InterUnitDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deployment of [{} ({})] failed due to unsatisfied dependency on [{} ({})]",
            self.dependent, self.dependent_state, self.dependency, self.dependency_state
        )
    }
}

/// Finds inter-unit dependencies among a unit's problem services
#[derive(Debug, Clone)]
pub struct UnitDiagnoser<Q> {
    statuses: Q,
    naming: UnitNaming,
}

impl<Q: StatusQuery> UnitDiagnoser<Q> {
    pub fn new(statuses: Q, naming: UnitNaming) -> Self {
        Self { statuses, naming }
    }

    #[inline]
    pub fn naming(&self) -> &UnitNaming {
        &self.naming
    }

    /// Inspect failed and blocked services of one unit
    ///
    /// Every dependency found is logged at error level and returned. The
    /// status listing is queried at most once, and only when `problems` is
    /// non-empty.
    pub fn diagnose(&self, problems: &[ServiceSnapshot]) -> Vec<InterUnitDependency> {
        if problems.is_empty() {
            return Vec::new();
        }
        let statuses: HashMap<String, ServiceStatus> = self
            .statuses
            .query_statuses()
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();

        let mut found = Vec::new();
        for service in problems {
            let canonical = service.name.canonical_name();
            if !self.naming.is_install_service(&canonical) {
                continue;
            }
            let dependencies: Vec<String> = match statuses.get(&canonical) {
                Some(status) => status.dependencies.clone(),
                None => service
                    .dependencies
                    .iter()
                    .map(ServiceName::canonical_name)
                    .collect(),
            };
            for dependency in dependencies {
                let state = statuses
                    .get(&dependency)
                    .map_or(MISSING_STATE, |s| s.state.as_str());
                if !self.naming.is_incomplete_marker(&dependency, state) {
                    continue;
                }
                tracing::debug!(target: DEPLOYMENT_TARGET, dependency = %dependency, state, "incomplete unit dependency");
                found.push(InterUnitDependency {
                    dependent: self.naming.dependent_unit(&canonical),
                    dependent_state: service.state().name().to_string(),
                    dependency: self.naming.dependency_unit(&dependency),
                    dependency_state: state.to_string(),
                });
            }
        }

        for dependency in &found {
            tracing::error!(target: DEPLOYMENT_TARGET, "{dependency}");
        }
        found
    }
}

/// Per-unit diagnosis step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDependencyHandler {
    unit: ServiceName,
}

impl UnitDependencyHandler {
    #[must_use]
    pub fn new(unit: ServiceName) -> Self {
        Self { unit }
    }

    #[inline]
    #[must_use]
    pub fn unit(&self) -> &ServiceName {
        &self.unit
    }

    /// Look up the unit's problems and report inter-unit dependencies
    ///
    /// # Errors
    /// Returns [`VerifyError::UnknownUnit`] if `source` does not know the unit
    pub fn execute<P, Q>(
        &self,
        source: &P,
        diagnoser: &UnitDiagnoser<Q>,
    ) -> Result<Vec<InterUnitDependency>, VerifyError>
    where
        P: UnitProblemSource + ?Sized,
        Q: StatusQuery,
    {
        let problems = source
            .problems_for_unit(&self.unit)
            .ok_or_else(|| VerifyError::UnknownUnit(self.unit.clone()))?;
        Ok(diagnoser.diagnose(&problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_unit_names() {
        let naming = UnitNaming::default();
        assert_eq!(
            naming.dependent_unit("deployment.subunit.app1.INSTALL"),
            UnitName::Named("app1".into())
        );
        assert_eq!(
            naming.dependency_unit(r#"deployment.subunit."app.ear"."app2.war".deploymentCompleteService"#),
            UnitName::Named(r#""app.ear"."app2.war""#.into())
        );
    }

    #[test]
    fn bad_names_are_unparseable() {
        let naming = UnitNaming::default();
        for raw in [
            "other.app1.INSTALL",
            "deployment.subunit.INSTALL",
            "deployment.subunitapp1.INSTALL",
            "deployment.subunit.app1INSTALL",
            "",
        ] {
            assert_eq!(naming.dependent_unit(raw), UnitName::Unparseable(raw.into()));
        }
        assert_eq!(
            UnitName::Unparseable("x.y".into()).to_string(),
            "<unparseable:x.y>"
        );
    }

    #[test]
    fn incomplete_marker_requires_suffix_and_not_up() {
        let naming = UnitNaming::default();
        let marker = "deployment.subunit.app2.deploymentCompleteService";
        assert!(naming.is_incomplete_marker(marker, "DOWN"));
        assert!(naming.is_incomplete_marker(marker, MISSING_STATE));
        assert!(!naming.is_incomplete_marker(marker, "UP"));
        assert!(!naming.is_incomplete_marker("deployment.subunit.app2.INSTALL", "DOWN"));
    }

    #[test]
    fn renders_line() {
        let line = InterUnitDependency {
            dependent: UnitName::Named("app1".into()),
            dependent_state: "FAILED".into(),
            dependency: UnitName::Named("app2".into()),
            dependency_state: MISSING_STATE.into(),
        };
        assert_eq!(
            line.to_string(),
            "Deployment of [app1 (FAILED)] failed due to unsatisfied dependency on [app2 (MISSING)]"
        );
    }

    #[test]
    fn custom_naming() {
        let naming = UnitNaming::default()
            .with_namespace("server.deployment.subunit")
            .with_install_suffix("SETUP")
            .with_completion_suffix("done");
        assert!(naming.is_install_service("server.deployment.subunit.a.SETUP"));
        assert_eq!(
            naming.dependency_unit("server.deployment.subunit.b.done"),
            UnitName::Named("b".into())
        );
    }
}
