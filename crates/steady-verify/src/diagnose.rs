//! Service-level diagnosis
//!
//! Turns a [`QuiescenceResult`] into a [`DiagnosticReport`]. Apart from the
//! graph-wide scan of missing dependencies, which reads the injected
//! [`RuntimeRegistry`], every step is a pure function of the result.

use crate::report::{DiagnosticReport, TransitiveDependencyProblem};
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeSet;
use steady_model::{
    QuiescenceResult, RuntimeId, RuntimeRegistry, ServiceName, ServiceSnapshot, Substate,
};

/// Failed service names followed by every immediately unavailable dependency
/// of a problem service
#[must_use]
pub fn missing_required(result: &QuiescenceResult) -> IndexSet<ServiceName> {
    result
        .failed()
        .map(|s| s.name.clone())
        .chain(
            result
                .problems()
                .flat_map(|s| s.immediately_unavailable.iter().cloned()),
        )
        .collect()
}

/// Problem services blocked only through a deeper chain
#[must_use]
pub fn missing_transitive(result: &QuiescenceResult) -> Vec<&ServiceSnapshot> {
    result
        .problems()
        .filter(|s| s.immediately_unavailable.is_empty())
        .collect()
}

/// `"<service> is missing [a, b]"` for each directly blocked service
#[must_use]
pub fn missing_dependency_lines(result: &QuiescenceResult) -> Vec<String> {
    result
        .problems()
        .filter(|s| !s.immediately_unavailable.is_empty())
        .map(|s| {
            let missing = s
                .immediately_unavailable
                .iter()
                .map(ServiceName::canonical_name)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} is missing [{missing}]", s.name.canonical_name())
        })
        .collect()
}

/// Failed service → start failure with its full cause chain
#[must_use]
pub fn describe_failures(result: &QuiescenceResult) -> IndexMap<ServiceName, String> {
    result
        .failed()
        .map(|s| {
            let description = s
                .start_failure
                .as_ref()
                .map(|f| f.describe())
                .unwrap_or_default();
            (s.name.clone(), description)
        })
        .collect()
}

/// Whether a runtime-wide problem service counts toward the missing closure
fn counts_as_missing_source(snapshot: &ServiceSnapshot) -> bool {
    snapshot.substate == Substate::Problem && !snapshot.mode.is_inert()
}

/// Builds [`DiagnosticReport`]s, reading graph-wide state from `R`
#[derive(Debug, Clone)]
pub struct ServiceDiagnoser<R> {
    registry: R,
}

impl<R: RuntimeRegistry> ServiceDiagnoser<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    #[inline]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Classify a quiescence result
    ///
    /// A stable result yields an empty report.
    pub fn diagnose(&self, result: &QuiescenceResult) -> DiagnosticReport {
        if result.is_stable() {
            return DiagnosticReport::default();
        }

        let missing_required = missing_required(result);
        let transitive = missing_transitive(result);
        let all_missing = self.all_missing(&transitive);

        let mut report = DiagnosticReport {
            failed_services: describe_failures(result),
            services_missing_dependencies: missing_dependency_lines(result),
            missing_transitive_dependency_problem: None,
            missing_required_services: IndexSet::new(),
        };

        if all_missing.iter().any(|m| !missing_required.contains(m)) {
            report.missing_transitive_dependency_problem = Some(TransitiveDependencyProblem {
                missing_transitive_dependents: transitive.iter().map(|s| s.name.clone()).collect(),
                missing_transitive_dependencies: all_missing,
            });
        }
        report.missing_required_services = missing_required;

        tracing::debug!(
            failed = result.failed_count(),
            problems = result.problem_count(),
            transitive = transitive.len(),
            "diagnosed quiescence result"
        );
        report
    }

    /// Union of the unavailable dependencies of every problem service in each
    /// runtime that hosts a transitively blocked service
    pub fn all_missing(&self, transitive: &[&ServiceSnapshot]) -> BTreeSet<ServiceName> {
        let runtimes: IndexSet<RuntimeId> = transitive.iter().map(|s| s.runtime).collect();
        let mut all_missing = BTreeSet::new();
        for runtime in runtimes {
            let Some(services) = self.registry.services(runtime) else {
                tracing::warn!(%runtime, "runtime not found while scanning for missing services");
                continue;
            };
            for snapshot in services.iter().filter(|s| counts_as_missing_source(s)) {
                all_missing.extend(snapshot.immediately_unavailable.iter().cloned());
            }
        }
        all_missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use steady_model::{Mode, StartFailure};

    struct Registry {
        id: RuntimeId,
        services: Vec<ServiceSnapshot>,
    }

    impl RuntimeRegistry for Registry {
        fn services(&self, runtime: RuntimeId) -> Option<Vec<ServiceSnapshot>> {
            (runtime == self.id).then(|| self.services.clone())
        }
    }

    fn name(s: &str) -> ServiceName {
        ServiceName::parse(s).unwrap()
    }

    fn problem(id: RuntimeId, n: &str, missing: &[&str]) -> ServiceSnapshot {
        missing.iter().fold(
            ServiceSnapshot::new(name(n), id).with_substate(Substate::Problem),
            |s, m| s.with_unavailable(name(m)),
        )
    }

    #[test]
    fn missing_required_lists_failed_first() {
        let id = RuntimeId::new();
        let result = QuiescenceResult::new(
            [ServiceSnapshot::new(name("svc.f"), id).with_start_failure(StartFailure::new("E"))],
            [problem(id, "svc.p", &["svc.x", "svc.f"])],
        )
        .unwrap();
        let names: Vec<_> = missing_required(&result).into_iter().collect();
        assert_eq!(names, vec![name("svc.f"), name("svc.x")]);
    }

    #[test]
    fn lines_skip_transitive_services() {
        let id = RuntimeId::new();
        let result = QuiescenceResult::new(
            Vec::<ServiceSnapshot>::new(),
            [
                problem(id, "svc.a", &["svc.x", "svc.y"]),
                problem(id, "svc.t", &[]),
            ],
        )
        .unwrap();
        assert_eq!(
            missing_dependency_lines(&result),
            vec!["svc.a is missing [svc.x, svc.y]".to_string()]
        );
        assert_eq!(missing_transitive(&result).len(), 1);
    }

    #[test]
    fn failure_without_cause_is_empty_description() {
        let id = RuntimeId::new();
        let result = QuiescenceResult::new(
            [ServiceSnapshot::new(name("svc.f"), id).with_substate(Substate::StartFailed)],
            Vec::<ServiceSnapshot>::new(),
        )
        .unwrap();
        assert_eq!(describe_failures(&result)[&name("svc.f")], "");
    }

    #[test]
    fn inert_modes_are_excluded_from_closure() {
        let id = RuntimeId::new();
        let registry = Registry {
            id,
            services: vec![
                problem(id, "svc.a", &["svc.x"]),
                problem(id, "svc.never", &["svc.y"]).with_mode(Mode::Never),
                problem(id, "svc.removing", &["svc.z"]).with_mode(Mode::Remove),
            ],
        };
        let diagnoser = ServiceDiagnoser::new(&registry);
        let transitive = problem(id, "svc.t", &[]);
        let missing = diagnoser.all_missing(&[&transitive]);
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec![name("svc.x")]);
    }

    #[test]
    fn unknown_runtime_contributes_nothing() {
        let registry = Registry {
            id: RuntimeId::new(),
            services: Vec::new(),
        };
        let diagnoser = ServiceDiagnoser::new(&registry);
        let stray = problem(RuntimeId::new(), "svc.t", &[]);
        assert!(diagnoser.all_missing(&[&stray]).is_empty());
    }
}
