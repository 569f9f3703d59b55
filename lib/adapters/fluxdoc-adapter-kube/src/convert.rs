use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{ContainerStatus, Event, Pod};
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use fluxdoc_domain::{
    ChartSpec, ClusterEvent, Condition, ContainerSummary, DependencyRef, InventoryEntry,
    ManagedResource, PodSummary, ReleaseSnapshot, Remediation, ResourceKind, ResourceSpec,
    ResourceStatus, SourceRef,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireSpec {
    source_ref: Option<SourceRef>,
    depends_on: Vec<DependencyRef>,
    suspend: bool,
    path: Option<String>,
    interval: Option<String>,
    /// A string on HelmChart, a template object on HelmRelease.
    chart: Option<Value>,
    version: Option<String>,
    chart_ref: Option<SourceRef>,
    install: Option<WireAction>,
    upgrade: Option<WireAction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireAction {
    remediation: Option<WireRemediation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireRemediation {
    retries: i64,
    strategy: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireChartTemplate {
    spec: WireChartSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireChartSpec {
    chart: String,
    version: String,
    source_ref: Option<SourceRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireStatus {
    observed_generation: i64,
    conditions: Vec<Condition>,
    last_applied_revision: Option<String>,
    last_attempted_revision: Option<String>,
    inventory: Option<WireInventory>,
    history: Vec<ReleaseSnapshot>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireInventory {
    entries: Vec<InventoryEntry>,
}

/// Decodes `data[field]`, treating an absent or malformed block as empty.
fn section<T: DeserializeOwned + Default>(object: &DynamicObject, field: &str) -> T {
    match object.data.get(field) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|error| {
            warn!(
                name = object.metadata.name.as_deref().unwrap_or_default(),
                field,
                %error,
                "ignoring undecodable block"
            );
            T::default()
        }),
    }
}

pub fn managed_resource(kind: ResourceKind, object: DynamicObject) -> ManagedResource {
    let spec: WireSpec = section(&object, "spec");
    let status: WireStatus = section(&object, "status");

    let mut resource = ManagedResource::new(
        kind,
        object.metadata.namespace.clone().unwrap_or_default(),
        object.metadata.name.clone().unwrap_or_default(),
    );
    resource.generation = object.metadata.generation.unwrap_or_default();
    resource.created_at = object.metadata.creation_timestamp.as_ref().and_then(timestamp);
    resource.spec = resource_spec(spec);
    resource.status = ResourceStatus {
        observed_generation: status.observed_generation,
        conditions: status.conditions,
        last_applied_revision: status.last_applied_revision,
        last_attempted_revision: status.last_attempted_revision,
        inventory: status.inventory.map(|inv| inv.entries).unwrap_or_default(),
        history: status.history,
    };
    resource
}

fn resource_spec(wire: WireSpec) -> ResourceSpec {
    let mut source_ref = wire.source_ref;
    let chart = match wire.chart {
        Some(Value::String(chart)) => Some(ChartSpec {
            chart,
            version: wire.version.unwrap_or_default(),
        }),
        Some(template @ Value::Object(_)) => {
            let template: WireChartTemplate =
                serde_json::from_value(template).unwrap_or_default();
            if source_ref.is_none() {
                source_ref = template.spec.source_ref;
            }
            Some(ChartSpec {
                chart: template.spec.chart,
                version: template.spec.version,
            })
        }
        _ => None,
    };

    ResourceSpec {
        source_ref,
        depends_on: wire.depends_on,
        suspend: wire.suspend,
        path: wire.path,
        interval: wire.interval,
        chart,
        chart_ref: wire.chart_ref,
        remediation: remediation(wire.install, wire.upgrade),
    }
}

fn remediation(install: Option<WireAction>, upgrade: Option<WireAction>) -> Option<Remediation> {
    let install = install.and_then(|action| action.remediation);
    let upgrade = upgrade.and_then(|action| action.remediation);
    if install.is_none() && upgrade.is_none() {
        return None;
    }
    let (upgrade_retries, upgrade_strategy) = upgrade
        .map(|remediation| (remediation.retries, remediation.strategy))
        .unwrap_or_default();
    Some(Remediation {
        install_retries: install.map(|remediation| remediation.retries).unwrap_or_default(),
        upgrade_retries,
        upgrade_strategy,
    })
}

/// Reads a `Time` or `MicroTime` through its serialized RFC 3339 form.
fn timestamp<T: Serialize>(time: &T) -> Option<DateTime<Utc>> {
    let value = serde_json::to_value(time).ok()?;
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

pub fn cluster_event(event: Event) -> ClusterEvent {
    let involved = event.involved_object;
    let last_seen = event
        .last_timestamp
        .as_ref()
        .and_then(timestamp)
        .or_else(|| event.event_time.as_ref().and_then(timestamp))
        .or_else(|| event.metadata.creation_timestamp.as_ref().and_then(timestamp));

    ClusterEvent {
        namespace: involved
            .namespace
            .or(event.metadata.namespace)
            .unwrap_or_default(),
        object_name: involved.name.unwrap_or_default(),
        r#type: event.type_.unwrap_or_default(),
        reason: event.reason.unwrap_or_default(),
        message: event.message.unwrap_or_default(),
        count: event.count.unwrap_or(1),
        last_seen,
    }
}

fn container_summary(status: ContainerStatus) -> ContainerSummary {
    let state = status.state.unwrap_or_default();
    ContainerSummary {
        ready: status.ready,
        waiting_reason: state.waiting.and_then(|waiting| waiting.reason),
        terminated_reason: state.terminated.and_then(|terminated| terminated.reason),
    }
}

pub fn pod_summary(pod: Pod) -> PodSummary {
    let status = pod.status.unwrap_or_default();
    PodSummary {
        namespace: pod.metadata.namespace.unwrap_or_default(),
        name: pod.metadata.name.unwrap_or_default(),
        phase: status.phase.unwrap_or_default(),
        containers: status
            .container_statuses
            .unwrap_or_default()
            .into_iter()
            .map(container_summary)
            .collect(),
        init_containers: status
            .init_container_statuses
            .unwrap_or_default()
            .into_iter()
            .map(container_summary)
            .collect(),
    }
}
