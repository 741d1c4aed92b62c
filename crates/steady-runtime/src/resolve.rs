//! Dependency resolution for dormant services
//!
//! After every mutation the container recomputes, for each service, which
//! immediate dependencies are unavailable, and moves dormant services
//! (`NEW`, `DOWN`, `PROBLEM`) between `DOWN` and `PROBLEM`.

use crate::container::ServiceRecord;
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use steady_model::{Mode, ServiceName, Substate};

pub(crate) type Services = IndexMap<ServiceName, ServiceRecord>;

/// Whether `dependency` cannot be reached at all
fn is_unavailable(services: &Services, dependency: &ServiceName) -> bool {
    match services.get(dependency) {
        None => true,
        Some(record) => {
            record.mode.is_inert()
                || matches!(record.substate, Substate::Removing | Substate::Removed)
        }
    }
}

fn is_dormant(substate: Substate) -> bool {
    matches!(substate, Substate::New | Substate::Down | Substate::Problem)
}

/// Recompute unavailable sets and dormant sub-states in place
pub(crate) fn resolve(services: &mut Services) {
    let unavailable: Vec<IndexSet<ServiceName>> = {
        let view: &Services = services;
        view.values()
            .map(|record| {
                record
                    .dependencies
                    .iter()
                    .filter(|dep| is_unavailable(view, dep))
                    .cloned()
                    .collect()
            })
            .collect()
    };
    for (record, unavailable) in services.values_mut().zip(unavailable) {
        record.unavailable = unavailable;
    }

    // Edges run dependent -> dependency, so Tarjan's reverse topological
    // order visits dependencies before their dependents.
    let mut graph = DiGraph::<usize, ()>::with_capacity(services.len(), 0);
    let nodes: Vec<NodeIndex> = (0..services.len()).map(|i| graph.add_node(i)).collect();
    for (i, record) in services.values().enumerate() {
        for dep in &record.dependencies {
            if let Some(j) = services.get_index_of(dep) {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }

    for scc in tarjan_scc(&graph) {
        let members: Vec<usize> = scc.iter().map(|n| graph[*n]).collect();

        for &i in &members {
            if let Some((_, record)) = services.get_index_mut(i) {
                if is_dormant(record.substate) {
                    record.substate = Substate::Down;
                }
            }
        }

        // Cycles converge within one pass per member.
        for _ in 0..=members.len() {
            let mut changed = false;
            for &i in &members {
                let blocked = {
                    let Some((_, record)) = services.get_index(i) else {
                        continue;
                    };
                    if !is_dormant(record.substate) || record.mode == Mode::Never {
                        continue;
                    }
                    !record.unavailable.is_empty()
                        || record.dependencies.iter().any(|dep| {
                            services.get(dep).is_some_and(|d| {
                                matches!(d.substate, Substate::StartFailed | Substate::Problem)
                            })
                        })
                };
                if blocked {
                    if let Some((_, record)) = services.get_index_mut(i) {
                        if record.substate != Substate::Problem {
                            tracing::trace!(service = %record.name, "blocked by dependency");
                            record.substate = Substate::Problem;
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }
}
