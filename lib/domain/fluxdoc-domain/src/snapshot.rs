use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::event::{ClusterEvent, PodSummary};
use crate::resource::ManagedResource;

/// Offline capture of cluster state, loadable from YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSnapshot {
    pub resources: Vec<ManagedResource>,
    pub events: Vec<ClusterEvent>,
    pub pods: Vec<PodSummary>,
}

impl ClusterSnapshot {
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse fixture {}", path.display()))
    }
}
