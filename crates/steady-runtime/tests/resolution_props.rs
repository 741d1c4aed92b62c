use proptest::prelude::*;
use steady_model::{Mode, ServiceName, Substate};
use steady_runtime::{ServiceContainer, ServiceSpec};

fn graph() -> impl Strategy<Value = Vec<(usize, Vec<usize>, bool)>> {
    // (index, dependency indices up to 12 so some are never installed, never-mode)
    proptest::collection::vec(
        (proptest::collection::vec(0..12usize, 0..4), any::<bool>()),
        1..8,
    )
    .prop_map(|nodes| {
        nodes
            .into_iter()
            .enumerate()
            .map(|(i, (deps, never))| (i, deps, never))
            .collect()
    })
}

fn svc(i: usize) -> ServiceName {
    ServiceName::of(&["svc".to_string(), format!("n{i}")])
}

proptest! {
    #[test]
    fn prop_unavailable_dependency_means_problem(nodes in graph()) {
        let container = ServiceContainer::new();
        for (i, deps, never) in &nodes {
            let mut spec = ServiceSpec::new(svc(*i));
            if *never {
                spec = spec.with_mode(Mode::Never);
            }
            for d in deps {
                spec = spec.with_dependency(svc(*d));
            }
            container.install(spec).unwrap();
        }

        for snapshot in container.snapshot() {
            prop_assert!(matches!(snapshot.substate, Substate::Down | Substate::Problem));
            if snapshot.mode == Mode::Never {
                prop_assert_eq!(snapshot.substate, Substate::Down);
            } else if !snapshot.immediately_unavailable.is_empty() {
                prop_assert_eq!(snapshot.substate, Substate::Problem);
            }
            if snapshot.substate == Substate::Problem {
                let blocked_dep = snapshot.dependencies.iter().any(|d| {
                    container.service(d).map_or(true, |dep| {
                        dep.mode == Mode::Never || dep.substate == Substate::Problem
                    })
                });
                prop_assert!(blocked_dep);
            }
        }
    }
}
