use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use fluxdoc_domain::{ResourceKind, StatusView};
use fluxdoc_ui_presentation::formatting::{TextReport, diagram_block};

use super::{Diagnostician, chart_info, inventory_lines, resource_topology, unsupported_kind};
use crate::dependency::DependencyTracer;
use crate::report::DiagnosticReport;

impl Diagnostician {
    /// Source, dependency chain and managed objects of one resource as an
    /// indented tree plus diagram source.
    #[instrument(skip(self, cancel))]
    pub async fn resource_tree(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> DiagnosticReport {
        if kind.is_source() {
            return unsupported_kind(kind);
        }

        let scope = self.scope(cancel);
        let resource = match self.fetch_primary(&scope, kind, namespace, name).await {
            Ok(resource) => resource,
            Err(report) => return report,
        };
        let health = resource.health();

        let mut report = TextReport::new();
        report.header(&format!("Flux Resource Tree: {namespace}/{name} ({kind})"));

        match kind {
            ResourceKind::HelmRelease => {
                let (chart, version) = chart_info(&resource);
                report.line(format!("Chart: {chart}@{version}"));
            }
            _ => {
                let source = resource
                    .source_ref()
                    .map(|source| format!("{}/{}", source.kind, source.name))
                    .unwrap_or_else(|| "<none>".to_string());
                report.line(format!("Source: {source}"));
            }
        }
        report.line(format!("  -> {kind}: {} [{health}]", resource.id));

        let trace = DependencyTracer::new(&self.ports, &scope)
            .with_max_depth(self.config.max_dependency_depth)
            .trace(&resource)
            .await;
        debug!(lines = trace.lines.len(), "dependency trace complete");
        for line in trace.render_lines("  ") {
            report.line(line);
        }

        let inventory = &resource.status.inventory;
        if !inventory.is_empty() {
            report.line(format!("  Managed Resources ({}):", inventory.len()));
            inventory_lines(
                &mut report,
                inventory,
                self.config.tree_inventory_limit,
                "    ",
                false,
            );
        }

        let topology = resource_topology(&resource, &trace);
        report.blank();
        report.line(diagram_block(
            self.config.diagram,
            &topology.render(self.config.diagram),
        ));

        DiagnosticReport::success(report.finish())
    }
}
