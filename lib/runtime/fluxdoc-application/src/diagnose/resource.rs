use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use fluxdoc_domain::{
    Finding, HealthStatus, ManagedResource, ResourceKind, StatusView, condition,
    condition_message, condition_reason,
};
use fluxdoc_ui_presentation::formatting::{
    TextReport, diagram_block, format_age, truncate_revision, value_or_none,
};

use super::{Diagnostician, chart_info, event_line, inventory_lines, resource_topology, unsupported_kind};
use crate::actions::suggested_actions;
use crate::dependency::{DependencyTrace, DependencyTracer, TraceLine};
use crate::fetch::FetchScope;
use crate::report::DiagnosticReport;
use crate::source_health::check_source_health;

impl Diagnostician {
    /// Deep diagnosis of one Kustomization or HelmRelease.
    #[instrument(skip(self, cancel))]
    pub async fn diagnose_resource(
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
        info!(resource = %resource.id, %health, "diagnosing");

        let mut report = TextReport::new();
        report.header(&format!(
            "Flux {kind} Diagnosis: {} (namespace: {})",
            resource.name(),
            resource.namespace()
        ));
        overview(&mut report, &resource, health);
        if kind == ResourceKind::HelmRelease {
            remediation(&mut report, &resource);
        }
        conditions(&mut report, &resource);

        let mut findings = status_findings(&resource, health);

        if kind == ResourceKind::HelmRelease && !resource.status.history.is_empty() {
            report.section("Release History");
            for snapshot in &resource.status.history {
                report.line(format!(
                    "  v{}: {} (chart: {}, app: {})",
                    snapshot.version, snapshot.status, snapshot.chart_version, snapshot.app_version
                ));
            }
        }

        let trace = if kind == ResourceKind::Kustomization && !resource.spec.depends_on.is_empty() {
            let trace = DependencyTracer::new(&self.ports, &scope)
                .with_max_depth(self.config.max_dependency_depth)
                .trace(&resource)
                .await;
            report.section("Dependencies");
            for line in trace.render_lines("") {
                report.line(line);
            }
            findings.extend(dependency_findings(&trace));
            trace
        } else {
            DependencyTrace::default()
        };

        if let Some(finding) = self.source_finding(&scope, &resource).await {
            findings.push(finding);
        }

        if !resource.status.inventory.is_empty() {
            report.section(&format!(
                "Managed Resources ({})",
                resource.status.inventory.len()
            ));
            inventory_lines(
                &mut report,
                &resource.status.inventory,
                self.config.inventory_display_limit,
                "  ",
                true,
            );
        }

        match self.recent_events(&scope, &resource).await {
            Ok(events) if events.is_empty() => {}
            Ok(events) => {
                report.section("Recent Events");
                for event in &events {
                    report.line(event_line(event));
                }
            }
            Err(error) => {
                report.section("Recent Events");
                report.line(format!("  (could not fetch events: {error})"));
            }
        }

        report.blank().line("FINDINGS:");
        if findings.is_empty() {
            report.line(format!("  No issues found. {kind} appears healthy."));
        }
        for finding in &findings {
            report.finding("  ", finding);
        }

        report.blank().line("SUGGESTED ACTIONS:");
        let actions = suggested_actions(&resource, health);
        if actions.is_empty() {
            report.line(format!("  No specific actions needed. {kind} is healthy."));
        }
        for (index, action) in actions.iter().enumerate() {
            report.line(format!("{}. {action}", index + 1));
        }

        let topology = resource_topology(&resource, &trace);
        if !topology.edges().is_empty() {
            report.section("Dependency Graph");
            report.line(diagram_block(
                self.config.diagram,
                &topology.render(self.config.diagram),
            ));
        }

        DiagnosticReport::success(report.finish())
    }

    async fn source_finding(
        &self,
        scope: &FetchScope,
        resource: &ManagedResource,
    ) -> Option<Finding> {
        let kind = resource.source_kind()?;
        let source = resource.source_ref()?;
        let namespace = resource.source_namespace()?;
        check_source_health(&self.ports, scope, kind, &source.name, namespace).await
    }
}

fn overview(report: &mut TextReport, resource: &ManagedResource, health: HealthStatus) {
    report.key_value("STATUS", health.as_str());
    match resource.kind {
        ResourceKind::HelmRelease => {
            let (chart, version) = chart_info(resource);
            report.key_value("CHART", &chart);
            report.key_value("VERSION", &version);
        }
        _ => {
            let source = resource
                .source_ref()
                .map(|source| format!("{}/{}", source.kind, source.name))
                .unwrap_or_default();
            report.key_value("SOURCE", value_or_none(&source));
            report.key_value(
                "PATH",
                value_or_none(resource.spec.path.as_deref().unwrap_or_default()),
            );
        }
    }
    report.key_value(
        "INTERVAL",
        value_or_none(resource.spec.interval.as_deref().unwrap_or_default()),
    );
    report.key_value("SUSPENDED", &resource.suspended().to_string());
    if resource.kind == ResourceKind::Kustomization {
        report.key_value(
            "APPLIED REVISION",
            value_or_none(resource.status.last_applied_revision.as_deref().unwrap_or_default()),
        );
        report.key_value(
            "ATTEMPTED REVISION",
            value_or_none(resource.status.last_attempted_revision.as_deref().unwrap_or_default()),
        );
    }
    report.key_value("AGE", &format_age(resource.created_at));
}

fn remediation(report: &mut TextReport, resource: &ManagedResource) {
    report.section("Remediation Config");
    match &resource.spec.remediation {
        Some(remediation) => {
            report.line(format!("  Install retries: {}", remediation.install_retries));
            report.line(format!("  Upgrade retries: {}", remediation.upgrade_retries));
            if !remediation.upgrade_strategy.is_empty() {
                report.line(format!("  Upgrade strategy: {}", remediation.upgrade_strategy));
            }
        }
        None => {
            report.line("  (defaults)");
        }
    }
}

fn conditions(report: &mut TextReport, resource: &ManagedResource) {
    report.section("Conditions");
    if resource.conditions().is_empty() {
        report.line("  (none reported)");
    }
    for condition in resource.conditions() {
        let mut line = format!(
            "  {:<15} {:<6}  {}",
            condition.r#type,
            condition.status.as_str(),
            condition.message
        );
        if !condition.reason.is_empty() {
            line.push_str(&format!(" ({})", condition.reason));
        }
        report.line(line);
    }
}

/// Findings derived from the resource's own status, in report order.
fn status_findings(resource: &ManagedResource, health: HealthStatus) -> Vec<Finding> {
    let kind = resource.kind;
    let conditions = resource.conditions();
    let mut findings = Vec::new();

    if resource.suspended() {
        findings.push(Finding::info(format!(
            "{kind} is suspended, reconciliation paused"
        )));
    }

    match health {
        HealthStatus::Failed => findings.push(Finding::critical(format!(
            "Reconciliation failed: {}",
            condition_message(conditions, condition::READY)
        ))),
        HealthStatus::Stalled => findings.push(Finding::critical(format!(
            "Reconciliation stalled: {}",
            condition_message(conditions, condition::STALLED)
        ))),
        _ => {}
    }

    let applied = resource.status.last_applied_revision.as_deref().unwrap_or_default();
    let attempted = resource.status.last_attempted_revision.as_deref().unwrap_or_default();
    if !attempted.is_empty() && applied != attempted {
        findings.push(Finding::warning(format!(
            "Applied revision ({}) differs from attempted revision ({})",
            truncate_revision(applied),
            truncate_revision(attempted)
        )));
    }

    if kind == ResourceKind::HelmRelease {
        let released = condition_reason(conditions, condition::RELEASED);
        if !released.is_empty() && released != "Succeeded" {
            findings.push(Finding::warning(format!(
                "Release issue: {released}: {}",
                condition_message(conditions, condition::RELEASED)
            )));
        }
        if condition_reason(conditions, condition::TEST_SUCCESS) == "Failed" {
            findings.push(Finding::warning(format!(
                "Helm tests failed: {}",
                condition_message(conditions, condition::TEST_SUCCESS)
            )));
        }
    }

    findings
}

fn dependency_findings(trace: &DependencyTrace) -> Vec<Finding> {
    let mut findings: Vec<Finding> = trace
        .unhealthy()
        .map(|(id, health)| Finding::warning(format!("Dependency {id} is not Ready ({health})")))
        .collect();
    for line in trace.missing() {
        match line {
            TraceLine::NotFound { id, .. } => {
                findings.push(Finding::warning(format!("Dependency {id} not found")));
            }
            TraceLine::Unreachable { id, error, .. } => {
                findings.push(Finding::warning(format!(
                    "Dependency {id} could not be fetched: {error}"
                )));
            }
            _ => {}
        }
    }
    findings
}
