use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use fluxdoc_domain::{
    ClusterEvent, ClusterSnapshot, ManagedResource, PodSummary, ResourceId, ResourceKind,
    StoreError,
};

use crate::{EventStorePort, PodStorePort, ResourceStorePort, StoreResult};

#[derive(Default)]
struct StoreState {
    resources: BTreeMap<(ResourceKind, ResourceId), ManagedResource>,
    events: Vec<ClusterEvent>,
    pods: Vec<PodSummary>,
    kind_failures: HashMap<ResourceKind, StoreError>,
    event_failure: Option<StoreError>,
    pod_failure: Option<StoreError>,
    delays: HashMap<ResourceKind, Duration>,
}

/// Store backed by process memory. Serves fixtures and tests.
#[derive(Clone, Default)]
pub struct InMemoryClusterStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryClusterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ClusterSnapshot) -> Self {
        let store = Self::new();
        for resource in snapshot.resources {
            store.insert(resource);
        }
        for event in snapshot.events {
            store.push_event(event);
        }
        for pod in snapshot.pods {
            store.push_pod(pod);
        }
        store
    }

    pub fn insert(&self, resource: ManagedResource) {
        if let Ok(mut guard) = self.state.lock() {
            guard
                .resources
                .insert((resource.kind, resource.id.clone()), resource);
        }
    }

    pub fn push_event(&self, event: ClusterEvent) {
        if let Ok(mut guard) = self.state.lock() {
            guard.events.push(event);
        }
    }

    pub fn push_pod(&self, pod: PodSummary) {
        if let Ok(mut guard) = self.state.lock() {
            guard.pods.push(pod);
        }
    }

    /// Every get/list for `kind` fails with `error`.
    pub fn fail_kind(&self, kind: ResourceKind, error: StoreError) {
        if let Ok(mut guard) = self.state.lock() {
            guard.kind_failures.insert(kind, error);
        }
    }

    pub fn fail_events(&self, error: StoreError) {
        if let Ok(mut guard) = self.state.lock() {
            guard.event_failure = Some(error);
        }
    }

    pub fn fail_pods(&self, error: StoreError) {
        if let Ok(mut guard) = self.state.lock() {
            guard.pod_failure = Some(error);
        }
    }

    /// Every get/list for `kind` sleeps before answering.
    pub fn delay_kind(&self, kind: ResourceKind, delay: Duration) {
        if let Ok(mut guard) = self.state.lock() {
            guard.delays.insert(kind, delay);
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Other("in-memory store lock poisoned".to_string()))
    }

    async fn pause_for(&self, kind: ResourceKind) -> StoreResult<()> {
        let delay = self.lock()?.delays.get(&kind).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn kind_failure(&self, kind: ResourceKind) -> StoreResult<()> {
        match self.lock()?.kind_failures.get(&kind) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceStorePort for InMemoryClusterStore {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> StoreResult<ManagedResource> {
        self.pause_for(kind).await?;
        self.kind_failure(kind)?;
        let key = (kind, ResourceId::new(namespace, name));
        self.lock()?
            .resources
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<ManagedResource>> {
        self.pause_for(kind).await?;
        self.kind_failure(kind)?;
        let guard = self.lock()?;
        Ok(guard
            .resources
            .values()
            .filter(|resource| resource.kind == kind)
            .filter(|resource| namespace.is_none_or(|ns| resource.namespace() == ns))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventStorePort for InMemoryClusterStore {
    async fn events_for(
        &self,
        namespace: &str,
        object_name: &str,
    ) -> StoreResult<Vec<ClusterEvent>> {
        let guard = self.lock()?;
        if let Some(error) = &guard.event_failure {
            return Err(error.clone());
        }
        Ok(guard
            .events
            .iter()
            .filter(|event| event.namespace == namespace && event.object_name == object_name)
            .cloned()
            .collect())
    }

    async fn list_events(&self, namespace: &str) -> StoreResult<Vec<ClusterEvent>> {
        let guard = self.lock()?;
        if let Some(error) = &guard.event_failure {
            return Err(error.clone());
        }
        Ok(guard
            .events
            .iter()
            .filter(|event| event.namespace == namespace)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PodStorePort for InMemoryClusterStore {
    async fn list_pods(&self, namespace: &str) -> StoreResult<Vec<PodSummary>> {
        let guard = self.lock()?;
        if let Some(error) = &guard.pod_failure {
            return Err(error.clone());
        }
        Ok(guard
            .pods
            .iter()
            .filter(|pod| pod.namespace == namespace)
            .cloned()
            .collect())
    }
}
