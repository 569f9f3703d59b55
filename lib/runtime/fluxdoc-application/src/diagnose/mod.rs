//! Operator-facing reports built from the store ports.

mod resource;
mod system;
mod tree;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use fluxdoc_domain::{
    ClusterEvent, FluxdocConfig, InventoryEntry, ManagedResource, ResourceKind,
    StoreError,
};
use fluxdoc_ports::PortSet;
use fluxdoc_ui_presentation::formatting::{TextReport, value_or_none};

use crate::dependency::{DependencyTrace, TraceLine};
use crate::fetch::FetchScope;
use crate::report::DiagnosticReport;
use crate::topology::{Topology, node_key};

/// Entry point for every report. Holds no per-call state, so one instance can
/// serve concurrent calls.
#[derive(Clone)]
pub struct Diagnostician {
    ports: PortSet,
    config: FluxdocConfig,
}

impl Diagnostician {
    pub fn new(ports: PortSet, config: FluxdocConfig) -> Self {
        Self { ports, config }
    }

    fn scope(&self, cancel: &CancellationToken) -> FetchScope {
        FetchScope::new(self.config.fetch_timeout(), cancel.clone())
    }

    /// Mandatory fetch of the report's subject. Any failure ends the call.
    async fn fetch_primary(
        &self,
        scope: &FetchScope,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<ManagedResource, DiagnosticReport> {
        let action = format!("getting {kind} {namespace}/{name}");
        scope
            .run(&action, self.ports.resources.get(kind, namespace, name))
            .await
            .map_err(|error| DiagnosticReport::from_store_error(&action, &error))
    }

    /// Events for one object, most recent first, capped at `max_events`.
    async fn recent_events(
        &self,
        scope: &FetchScope,
        resource: &ManagedResource,
    ) -> Result<Vec<ClusterEvent>, StoreError> {
        let action = format!("listing events for {} {}", resource.kind, resource.id);
        let mut events = scope
            .run(
                &action,
                self.ports
                    .events
                    .events_for(resource.namespace(), resource.name()),
            )
            .await?;
        events.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        events.truncate(self.config.max_events);
        debug!(resource = %resource.id, count = events.len(), "fetched events");
        Ok(events)
    }
}

fn unsupported_kind(kind: ResourceKind) -> DiagnosticReport {
    DiagnosticReport::error(format!(
        "Unsupported resource kind: {kind} (use Kustomization or HelmRelease)"
    ))
}

fn event_line(event: &ClusterEvent) -> String {
    let mut line = format!(
        "  {:<8} {:<25} {}",
        event.r#type, event.reason, event.message
    );
    if event.count > 1 {
        line.push_str(&format!(" (x{})", event.count));
    }
    line
}

fn inventory_lines(
    report: &mut TextReport,
    entries: &[InventoryEntry],
    limit: usize,
    indent: &str,
    with_version: bool,
) {
    for entry in entries.iter().take(limit) {
        if with_version && !entry.version.is_empty() {
            report.line(format!("{indent}{} ({})", entry.id, entry.version));
        } else {
            report.line(format!("{indent}{}", entry.id));
        }
    }
    if entries.len() > limit {
        report.line(format!("{indent}... and {} more", entries.len() - limit));
    }
}

/// `(chart, version)` for display; chart references have no version.
fn chart_info(resource: &ManagedResource) -> (String, String) {
    if let Some(reference) = &resource.spec.chart_ref {
        return (
            format!("{}/{}", reference.kind, reference.name),
            "<chartref>".to_string(),
        );
    }
    match &resource.spec.chart {
        Some(chart) => (
            chart.chart.clone(),
            value_or_none(&chart.version).to_string(),
        ),
        None => ("<unknown>".to_string(), "<unknown>".to_string()),
    }
}

/// Diagram for one resource: its source, itself and traced dependencies.
fn resource_topology(resource: &ManagedResource, trace: &DependencyTrace) -> Topology {
    let mut topology = Topology::new();
    topology.add_resource(resource);
    topology.link_source(resource);
    for line in &trace.lines {
        if let TraceLine::Resolved { id, health, .. } = line {
            topology.add_node(
                &node_key(resource.kind, id),
                format!("{}: {}\n{}", resource.kind, id.name, health),
            );
        }
    }
    topology.link_dependencies(resource.kind, &trace.edges);
    topology
}
