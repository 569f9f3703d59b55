//! Domain models and invariants.

pub mod condition;
pub mod config;
pub mod error;
pub mod event;
pub mod finding;
pub mod health;
pub mod resource;
pub mod snapshot;

pub use condition::{Condition, ConditionStatus, condition_message, condition_reason, find_condition};
pub use config::{DiagramFormat, FluxdocConfig};
pub use error::{StoreError, UnknownKind};
pub use event::{ClusterEvent, ContainerSummary, PodSummary};
pub use finding::{Finding, Severity};
pub use health::HealthStatus;
pub use resource::{
    ChartSpec, DependencyRef, InventoryEntry, ManagedResource, ReleaseSnapshot, Remediation,
    ResourceId, ResourceKind, ResourceSpec, ResourceStatus, SourceRef, StatusView,
};
pub use snapshot::ClusterSnapshot;
