use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use fluxdoc_domain::{
    Finding, HealthStatus, ManagedResource, ResourceKind, StatusView, StoreError,
};
use fluxdoc_ui_presentation::formatting::{TextReport, diagram_block, sub_header};

use super::Diagnostician;
use crate::fetch::FetchScope;
use crate::report::DiagnosticReport;
use crate::topology::Topology;

impl Diagnostician {
    /// Cluster-wide health: controller pods, per-kind tallies, recent
    /// warnings and a topology of everything found.
    #[instrument(skip_all)]
    pub async fn diagnose_system(&self, cancel: &CancellationToken) -> DiagnosticReport {
        let scope = self.scope(cancel);
        let namespace = self.config.controller_namespace.as_str();

        let kustomizations = self.list_all(&scope, ResourceKind::Kustomization).await;
        if let Err(error @ StoreError::NotInstalled(_)) = &kustomizations {
            info!(%error, "flux CRDs missing");
            return DiagnosticReport::from_store_error("listing Kustomizations", error);
        }

        let mut report = TextReport::new();
        report.header("FluxCD System Health Report");
        let mut issues = 0usize;
        let mut everything: Vec<ManagedResource> = Vec::new();

        report.line(sub_header(&format!(
            "Flux Controllers ({namespace} namespace)"
        )));
        let action = format!("listing pods in {namespace}");
        match scope
            .run(&action, self.ports.pods.list_pods(namespace))
            .await
        {
            Err(error) => {
                report.line(format!("  (could not list pods: {error})"));
            }
            Ok(pods) if pods.is_empty() => {
                report.finding(
                    "",
                    &Finding::critical(format!(
                        "No pods found in {namespace} namespace. FluxCD may not be installed"
                    )),
                );
                issues += 1;
            }
            Ok(pods) => {
                let healthy = pods.iter().filter(|pod| pod.is_healthy()).count();
                report.line(format!("  Pods: {healthy}/{} healthy", pods.len()));
                for pod in pods.iter().filter(|pod| !pod.is_healthy()) {
                    report.finding(
                        "  ",
                        &Finding::critical(format!(
                            "Controller pod '{}' is unhealthy: {}",
                            pod.name,
                            pod.phase_reason()
                        )),
                    );
                    issues += 1;
                }
            }
        }

        for (kind, listed) in [
            (ResourceKind::Kustomization, kustomizations),
            (
                ResourceKind::HelmRelease,
                self.list_all(&scope, ResourceKind::HelmRelease).await,
            ),
        ] {
            report.section(&format!("{kind} Health"));
            match listed {
                Err(error) => {
                    report.line(format!("  (could not list: {error})"));
                }
                Ok(resources) => {
                    if primary_tally(&mut report, kind, &resources) {
                        issues += 1;
                    }
                    everything.extend(resources);
                }
            }
        }

        report.section("Source Health");
        let mut source_count = 0usize;
        let mut source_unhealthy = 0usize;
        for kind in ResourceKind::SOURCES {
            match self.list_all(&scope, kind).await {
                Err(error) => {
                    report.line(format!("  (could not list {kind}: {error})"));
                }
                Ok(sources) => {
                    source_count += sources.len();
                    if !sources.is_empty() {
                        let tally = tally_of(&sources);
                        report.line(format!("  {kind}: {}  {}", sources.len(), tally_line(&tally)));
                    }
                    for source in &sources {
                        let health = source.health();
                        if health.is_unhealthy() {
                            source_unhealthy += 1;
                            report.finding(
                                "  ",
                                &Finding::warning(format!("{kind} {}: {health}", source.id)),
                            );
                        }
                    }
                    everything.extend(sources);
                }
            }
        }
        if source_unhealthy > 0 {
            issues += 1;
        }
        report.line(format!(
            "  Total sources: {source_count}, Unhealthy: {source_unhealthy}"
        ));

        report.section("Recent Warning Events");
        let window = self.config.warning_window_minutes;
        let action = format!("listing events in {namespace}");
        match scope
            .run(&action, self.ports.events.list_events(namespace))
            .await
        {
            Err(error) => {
                report.line(format!("  (could not list events: {error})"));
            }
            Ok(events) => {
                let since = warning_cutoff(Utc::now(), window);
                let warnings = events
                    .iter()
                    .filter(|event| event.is_warning())
                    .filter(|event| {
                        event
                            .last_seen
                            .zip(since)
                            .is_some_and(|(seen, since)| seen > since)
                    })
                    .count();
                if warnings > 0 {
                    report.finding(
                        "  ",
                        &Finding::warning(format!(
                            "{warnings} warning events in {namespace} in the {}",
                            window_phrase(window)
                        )),
                    );
                    issues += 1;
                } else {
                    report.line(format!("  None in the {}", window_phrase(window)));
                }
            }
        }

        report.section("Overall Assessment");
        if issues == 0 {
            report.line("  FluxCD system appears healthy. No issues found.");
        } else {
            report.line(format!("  {issues} issue(s) found. Review findings above."));
        }
        info!(issues, resources = everything.len(), "system diagnosis complete");

        report.section("Topology");
        let topology = Topology::for_cluster(&everything);
        report.line(diagram_block(
            self.config.diagram,
            &topology.render(self.config.diagram),
        ));

        DiagnosticReport::success(report.finish())
    }

    async fn list_all(
        &self,
        scope: &FetchScope,
        kind: ResourceKind,
    ) -> Result<Vec<ManagedResource>, StoreError> {
        let action = format!("listing {kind} resources");
        scope
            .run(&action, self.ports.resources.list(kind, None))
            .await
    }
}

/// Writes the tally for one primary kind; returns whether anything is
/// failed or stalled.
fn primary_tally(report: &mut TextReport, kind: ResourceKind, resources: &[ManagedResource]) -> bool {
    let tally = tally_of(resources);
    let unhealthy: Vec<_> = resources
        .iter()
        .map(|resource| (resource, resource.health()))
        .filter(|(_, health)| health.is_unhealthy())
        .collect();

    report.line(format!("  Total: {}  {}", resources.len(), tally_line(&tally)));
    if unhealthy.is_empty() {
        return false;
    }
    report.finding(
        "  ",
        &Finding::warning(format!("{} {kind}s not healthy", unhealthy.len())),
    );
    for (resource, health) in unhealthy {
        report.line(format!("    - {}: {health}", resource.id));
    }
    true
}

fn tally_of(resources: &[ManagedResource]) -> BTreeMap<HealthStatus, usize> {
    let mut tally = BTreeMap::new();
    for resource in resources {
        *tally.entry(resource.health()).or_default() += 1;
    }
    tally
}

/// Oldest `last_seen` that still counts. A window too wide for the clock
/// counts everything; a non-positive one counts nothing.
fn warning_cutoff(now: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    if minutes <= 0 {
        return None;
    }
    let cutoff = Duration::try_minutes(minutes)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    Some(cutoff)
}

fn tally_line(tally: &BTreeMap<HealthStatus, usize>) -> String {
    HealthStatus::ALL
        .iter()
        .filter_map(|status| {
            tally
                .get(status)
                .filter(|count| **count > 0)
                .map(|count| format!("{status}: {count}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn window_phrase(minutes: i64) -> String {
    match minutes {
        60 => "last hour".to_string(),
        m if m > 0 && m % 60 == 0 => format!("last {} hours", m / 60),
        m => format!("last {m} minutes"),
    }
}
