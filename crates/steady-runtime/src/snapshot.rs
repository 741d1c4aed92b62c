//! Serializable runtime snapshots
//!
//! A snapshot lists every service with its mode, rest state and dependencies.
//! Restoring one rebuilds a container whose dormant services are resolved
//! exactly as if they had been installed live.

use crate::container::{ServiceContainer, ServiceRecord};
use crate::error::RuntimeError;
use crate::resolve::resolve;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use steady_model::{Mode, ServiceName, StartFailure, Substate};

/// Rest state recorded for a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotState {
    #[default]
    Down,
    Up,
    Failed,
}

/// One service in a [`RuntimeSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: ServiceName,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub state: SnapshotState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StartFailure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ServiceName>,
}

/// Whole-runtime snapshot, in installation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

impl RuntimeSnapshot {
    /// Decode from YAML
    pub fn from_yaml_str(input: &str) -> Result<Self, RuntimeError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Decode from JSON
    pub fn from_json_str(input: &str) -> Result<Self, RuntimeError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a snapshot file; `.json` is decoded as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        tracing::debug!(path = %path.display(), json = is_json, "loading runtime snapshot");
        if is_json {
            Self::from_json_str(&input)
        } else {
            Self::from_yaml_str(&input)
        }
    }

    /// Encode as YAML
    pub fn to_yaml_string(&self) -> Result<String, RuntimeError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Capture the rest states of a live container
    ///
    /// `STARTING` and `REMOVING` services are recorded as `DOWN`.
    #[must_use]
    pub fn capture(container: &ServiceContainer) -> Self {
        let services = container
            .snapshot()
            .into_iter()
            .map(|s| ServiceEntry {
                state: match s.substate {
                    Substate::Up => SnapshotState::Up,
                    Substate::StartFailed => SnapshotState::Failed,
                    _ => SnapshotState::Down,
                },
                failure: s.start_failure,
                mode: s.mode,
                dependencies: s.dependencies.into_iter().collect(),
                name: s.name,
            })
            .collect();
        Self { services }
    }
}

impl ServiceContainer {
    /// Build a fresh container holding every service of `snapshot`
    pub fn restore(snapshot: &RuntimeSnapshot) -> Result<Self, RuntimeError> {
        let container = Self::new();
        {
            let mut services = container.shared.services.lock();
            for entry in &snapshot.services {
                if services.contains_key(&entry.name) {
                    return Err(RuntimeError::DuplicateService(entry.name.clone()));
                }
                let dependencies: IndexSet<ServiceName> =
                    entry.dependencies.iter().cloned().collect();
                let mut record = ServiceRecord::new(entry.name.clone(), entry.mode, dependencies);
                match entry.state {
                    SnapshotState::Down => {}
                    SnapshotState::Up => record.substate = Substate::Up,
                    SnapshotState::Failed => {
                        record.substate = Substate::StartFailed;
                        record.start_failure = entry.failure.clone();
                    }
                }
                services.insert(entry.name.clone(), record);
            }
            resolve(&mut services);
        }
        tracing::debug!(
            runtime = %container.id(),
            services = snapshot.services.len(),
            "restored runtime snapshot"
        );
        Ok(container)
    }
}
