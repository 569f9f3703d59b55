//! Kubernetes-backed implementation of the store ports.
//!
//! Flux custom resources are read as dynamic objects so no generated CRD
//! types are needed; core Events and Pods use the typed k8s-openapi structs.

mod convert;
mod errors;
mod kinds;

use anyhow::Context;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::api::{Api, DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use fluxdoc_domain::{ClusterEvent, ManagedResource, PodSummary, ResourceKind};
use fluxdoc_ports::{EventStorePort, PodStorePort, ResourceStorePort, StoreResult};

pub use errors::{classify_api_failure, store_error};
pub use kinds::api_resource;

#[derive(Clone)]
pub struct KubeClusterStore {
    client: Client,
}

impl KubeClusterStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects with the ambient kubeconfig or in-cluster service account,
    /// or with the named kubeconfig context.
    pub async fn connect(context: Option<&str>) -> anyhow::Result<Self> {
        let client = match context {
            None => Client::try_default()
                .await
                .context("failed to create Kubernetes client")?,
            Some(context) => {
                let kubeconfig = Kubeconfig::read().context("failed to read kubeconfig")?;
                let options = KubeConfigOptions {
                    context: Some(context.to_string()),
                    ..Default::default()
                };
                let config = Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .with_context(|| format!("failed to load kubeconfig context {context}"))?;
                Client::try_from(config).context("failed to create Kubernetes client")?
            }
        };
        debug!(namespace = client.default_namespace(), "kube client ready");
        Ok(Self::new(client))
    }

    fn flux_api(&self, kind: ResourceKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = api_resource(kind);
        match namespace {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

#[async_trait]
impl ResourceStorePort for KubeClusterStore {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> StoreResult<ManagedResource> {
        let object = self
            .flux_api(kind, Some(namespace))
            .get(name)
            .await
            .map_err(store_error)?;
        Ok(convert::managed_resource(kind, object))
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<ManagedResource>> {
        let list = self
            .flux_api(kind, namespace)
            .list(&ListParams::default())
            .await
            .map_err(store_error)?;
        debug!(%kind, count = list.items.len(), "listed flux resources");
        Ok(list
            .items
            .into_iter()
            .map(|object| convert::managed_resource(kind, object))
            .collect())
    }
}

#[async_trait]
impl EventStorePort for KubeClusterStore {
    async fn events_for(
        &self,
        namespace: &str,
        object_name: &str,
    ) -> StoreResult<Vec<ClusterEvent>> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().fields(&format!("involvedObject.name={object_name}"));
        let list = api.list(&params).await.map_err(store_error)?;
        Ok(list.items.into_iter().map(convert::cluster_event).collect())
    }

    async fn list_events(&self, namespace: &str) -> StoreResult<Vec<ClusterEvent>> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(store_error)?;
        Ok(list.items.into_iter().map(convert::cluster_event).collect())
    }
}

#[async_trait]
impl PodStorePort for KubeClusterStore {
    async fn list_pods(&self, namespace: &str) -> StoreResult<Vec<PodSummary>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(store_error)?;
        Ok(list.items.into_iter().map(convert::pod_summary).collect())
    }
}
