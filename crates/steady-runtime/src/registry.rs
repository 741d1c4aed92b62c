//! Lookup across several runtime instances

use crate::container::ServiceContainer;
use indexmap::IndexMap;
use parking_lot::RwLock;
use steady_model::{RuntimeId, RuntimeRegistry, ServiceSnapshot};

/// Registry of containers keyed by [`RuntimeId`]
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    containers: RwLock<IndexMap<RuntimeId, ServiceContainer>>,
}

impl ContainerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container; replaces any previous handle with the same id
    pub fn register(&self, container: ServiceContainer) {
        self.containers.write().insert(container.id(), container);
    }

    /// Drop a container from the registry
    pub fn unregister(&self, runtime: RuntimeId) -> Option<ServiceContainer> {
        self.containers.write().shift_remove(&runtime)
    }

    #[must_use]
    pub fn get(&self, runtime: RuntimeId) -> Option<ServiceContainer> {
        self.containers.read().get(&runtime).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.read().is_empty()
    }
}

impl RuntimeRegistry for ContainerRegistry {
    fn services(&self, runtime: RuntimeId) -> Option<Vec<ServiceSnapshot>> {
        self.get(runtime).map(|c| c.snapshot())
    }
}
