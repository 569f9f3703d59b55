//! Read-only seams between the diagnostic engine and a cluster.

use std::sync::Arc;

use async_trait::async_trait;

use fluxdoc_domain::{ClusterEvent, ManagedResource, PodSummary, ResourceKind, StoreError};

mod memory;

pub use memory::InMemoryClusterStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ResourceStorePort: Send + Sync {
    /// Fetches one resource. Absence is `StoreError::NotFound`.
    async fn get(&self, kind: ResourceKind, namespace: &str, name: &str)
    -> StoreResult<ManagedResource>;

    /// Lists a kind in one namespace, or cluster-wide when `namespace` is `None`.
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<ManagedResource>>;
}

#[async_trait]
pub trait EventStorePort: Send + Sync {
    async fn events_for(&self, namespace: &str, object_name: &str)
    -> StoreResult<Vec<ClusterEvent>>;

    async fn list_events(&self, namespace: &str) -> StoreResult<Vec<ClusterEvent>>;
}

#[async_trait]
pub trait PodStorePort: Send + Sync {
    async fn list_pods(&self, namespace: &str) -> StoreResult<Vec<PodSummary>>;
}

#[derive(Clone)]
pub struct PortSet {
    pub resources: Arc<dyn ResourceStorePort>,
    pub events: Arc<dyn EventStorePort>,
    pub pods: Arc<dyn PodStorePort>,
}

impl PortSet {
    /// Wires every port to one backing store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ResourceStorePort + EventStorePort + PodStorePort + 'static,
    {
        Self {
            resources: store.clone(),
            events: store.clone(),
            pods: store,
        }
    }
}
