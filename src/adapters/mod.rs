use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use fluxdoc_application::Diagnostician;
use fluxdoc_domain::{ClusterSnapshot, FluxdocConfig};
use fluxdoc_ports::{InMemoryClusterStore, PortSet};

/// Where reports read cluster state from.
#[derive(Clone)]
pub enum FluxdocBackend {
    Fixture(InMemoryClusterStore),
    #[cfg(feature = "kube")]
    Kube(fluxdoc_adapter_kube::KubeClusterStore),
}

impl FluxdocBackend {
    pub fn from_fixture(path: &Path) -> anyhow::Result<Self> {
        let snapshot = ClusterSnapshot::load_from_path(path)
            .with_context(|| format!("Failed to load fixture at {}", path.display()))?;
        info!(
            resources = snapshot.resources.len(),
            events = snapshot.events.len(),
            pods = snapshot.pods.len(),
            "fixture loaded"
        );
        Ok(Self::Fixture(InMemoryClusterStore::from_snapshot(snapshot)))
    }

    #[cfg(feature = "kube")]
    pub async fn connect(context: Option<&str>) -> anyhow::Result<Self> {
        let store = fluxdoc_adapter_kube::KubeClusterStore::connect(context).await?;
        Ok(Self::Kube(store))
    }

    pub fn ports(&self) -> PortSet {
        match self {
            Self::Fixture(store) => PortSet::from_store(Arc::new(store.clone())),
            #[cfg(feature = "kube")]
            Self::Kube(store) => PortSet::from_store(Arc::new(store.clone())),
        }
    }

    pub fn diagnostician(&self, config: FluxdocConfig) -> Diagnostician {
        Diagnostician::new(self.ports(), config)
    }
}
