//! Flux-managed resources as the diagnostic engine sees them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::UnknownKind;
use crate::health::{self, HealthStatus};

/// Namespace plus name; unique per kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    pub namespace: String,
    pub name: String,
}

impl ResourceId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Kustomization,
    HelmRelease,
    GitRepository,
    #[serde(rename = "OCIRepository")]
    OciRepository,
    HelmRepository,
    HelmChart,
    Bucket,
}

impl ResourceKind {
    pub const SOURCES: [ResourceKind; 5] = [
        ResourceKind::GitRepository,
        ResourceKind::OciRepository,
        ResourceKind::HelmRepository,
        ResourceKind::HelmChart,
        ResourceKind::Bucket,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kustomization => "Kustomization",
            Self::HelmRelease => "HelmRelease",
            Self::GitRepository => "GitRepository",
            Self::OciRepository => "OCIRepository",
            Self::HelmRepository => "HelmRepository",
            Self::HelmChart => "HelmChart",
            Self::Bucket => "Bucket",
        }
    }

    pub fn is_source(self) -> bool {
        !matches!(self, Self::Kustomization | Self::HelmRelease)
    }

    /// Kind as spelled in `flux` CLI commands.
    pub fn cli_name(self) -> &'static str {
        match self {
            Self::Kustomization => "kustomization",
            Self::HelmRelease => "helmrelease",
            Self::GitRepository => "source git",
            Self::OciRepository => "source oci",
            Self::HelmRepository => "source helm",
            Self::HelmChart => "source chart",
            Self::Bucket => "source bucket",
        }
    }

    /// Prefix used for diagram node identifiers.
    pub fn node_prefix(self) -> &'static str {
        match self {
            Self::Kustomization => "ks",
            Self::HelmRelease => "hr",
            Self::GitRepository => "git",
            Self::OciRepository => "oci",
            Self::HelmRepository => "helmrepo",
            Self::HelmChart => "helmchart",
            Self::Bucket => "bucket",
        }
    }

    /// Controller deployment that reconciles this kind.
    pub fn controller(self) -> &'static str {
        match self {
            Self::Kustomization => "kustomize-controller",
            Self::HelmRelease => "helm-controller",
            _ => "source-controller",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kustomization" | "kustomizations" | "ks" => Ok(Self::Kustomization),
            "helmrelease" | "helmreleases" | "hr" => Ok(Self::HelmRelease),
            "gitrepository" | "gitrepositories" | "git" => Ok(Self::GitRepository),
            "ocirepository" | "ocirepositories" | "oci" => Ok(Self::OciRepository),
            "helmrepository" | "helmrepositories" | "helmrepo" | "helm" => {
                Ok(Self::HelmRepository)
            }
            "helmchart" | "helmcharts" | "chart" => Ok(Self::HelmChart),
            "bucket" | "buckets" => Ok(Self::Bucket),
            _ => Err(UnknownKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(default)]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: String,
    #[serde(rename = "v", alias = "version", default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSnapshot {
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub chart_version: String,
    #[serde(default)]
    pub app_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    #[serde(default)]
    pub install_retries: i64,
    #[serde(default)]
    pub upgrade_retries: i64,
    #[serde(default)]
    pub upgrade_strategy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSpec {
    pub source_ref: Option<SourceRef>,
    pub depends_on: Vec<DependencyRef>,
    pub suspend: bool,
    pub path: Option<String>,
    pub interval: Option<String>,
    pub chart: Option<ChartSpec>,
    pub chart_ref: Option<SourceRef>,
    pub remediation: Option<Remediation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceStatus {
    pub observed_generation: i64,
    pub conditions: Vec<Condition>,
    pub last_applied_revision: Option<String>,
    pub last_attempted_revision: Option<String>,
    pub inventory: Vec<InventoryEntry>,
    pub history: Vec<ReleaseSnapshot>,
}

/// Read-only view of a Flux object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedResource {
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub id: ResourceId,
    #[serde(default)]
    pub generation: i64,
    #[serde(default)]
    pub spec: ResourceSpec,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default, rename = "creationTimestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ManagedResource {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: ResourceId::new(namespace, name),
            generation: 0,
            spec: ResourceSpec::default(),
            status: ResourceStatus::default(),
            created_at: None,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.id.namespace
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// Source reference, falling back to `spec.chartRef` for releases that
    /// point at an existing chart object.
    pub fn source_ref(&self) -> Option<&SourceRef> {
        self.spec.source_ref.as_ref().or(self.spec.chart_ref.as_ref())
    }

    /// Kind of the referenced source. Releases default to a Helm repository
    /// when the reference leaves it blank.
    pub fn source_kind(&self) -> Option<ResourceKind> {
        let source = self.source_ref()?;
        if source.kind.is_empty() {
            return match self.kind {
                ResourceKind::HelmRelease => Some(ResourceKind::HelmRepository),
                _ => None,
            };
        }
        source.kind.parse().ok()
    }

    /// Namespace the source lives in; defaults to the owner's namespace.
    pub fn source_namespace(&self) -> Option<&str> {
        let source = self.source_ref()?;
        Some(source.namespace.as_deref().unwrap_or(self.namespace()))
    }

    /// Declared dependencies with namespaces defaulted to the dependent's.
    pub fn dependency_ids(&self) -> Vec<ResourceId> {
        self.spec
            .depends_on
            .iter()
            .map(|dep| {
                let namespace = dep.namespace.as_deref().unwrap_or(self.namespace());
                ResourceId::new(namespace, dep.name.clone())
            })
            .collect()
    }
}

/// Anything that carries Flux-style reconciliation status.
pub trait StatusView {
    fn conditions(&self) -> &[Condition];
    fn generation(&self) -> i64;
    fn observed_generation(&self) -> i64;
    fn suspended(&self) -> bool;

    fn health(&self) -> HealthStatus {
        health::evaluate(
            self.conditions(),
            self.generation(),
            self.observed_generation(),
            self.suspended(),
        )
    }
}

impl StatusView for ManagedResource {
    fn conditions(&self) -> &[Condition] {
        &self.status.conditions
    }

    fn generation(&self) -> i64 {
        self.generation
    }

    fn observed_generation(&self) -> i64 {
        self.status.observed_generation
    }

    fn suspended(&self) -> bool {
        self.spec.suspend
    }
}
