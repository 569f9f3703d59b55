use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use fluxdoc_domain::{
    ChartSpec, ClusterEvent, Condition, ConditionStatus, ContainerSummary, FluxdocConfig,
    InventoryEntry, ManagedResource, PodSummary, ReleaseSnapshot, ResourceKind, StoreError,
    condition,
};
use fluxdoc_ports::{InMemoryClusterStore, PortSet};

use crate::diagnose::Diagnostician;
use crate::report::NOT_INSTALLED_GUIDANCE;
use crate::test_support::{depends_on, failing, fixture, ready, sourced_from};

fn diagnostician(ports: PortSet) -> Diagnostician {
    Diagnostician::new(ports, FluxdocConfig::default())
}

fn event(object: &str, kind: &str, reason: &str, message: &str, count: i32) -> ClusterEvent {
    ClusterEvent {
        namespace: "flux-system".to_string(),
        object_name: object.to_string(),
        r#type: kind.to_string(),
        reason: reason.to_string(),
        message: message.to_string(),
        count,
        last_seen: Some(Utc::now() - chrono::Duration::minutes(5)),
    }
}

fn pod(name: &str, ready: bool, waiting: Option<&str>) -> PodSummary {
    PodSummary {
        namespace: "flux-system".to_string(),
        name: name.to_string(),
        phase: "Running".to_string(),
        containers: vec![ContainerSummary {
            ready,
            waiting_reason: waiting.map(str::to_string),
            terminated_reason: None,
        }],
        init_containers: Vec::new(),
    }
}

/// fleet (Failed git) <- apps (Failed, depends on infra) ; infra (Ready)
fn seed_broken_apps(store: &InMemoryClusterStore) {
    store.insert(failing(
        ManagedResource::new(ResourceKind::GitRepository, "flux-system", "fleet"),
        "GitOperationFailed",
        "authentication required",
    ));
    store.insert(sourced_from(
        ready(ManagedResource::new(ResourceKind::Kustomization, "flux-system", "infra")),
        "GitRepository",
        "fleet",
    ));

    let mut apps = depends_on(
        sourced_from(
            failing(
                ManagedResource::new(ResourceKind::Kustomization, "flux-system", "apps"),
                "BuildFailed",
                "kustomize build failed: missing resource",
            ),
            "GitRepository",
            "fleet",
        ),
        &["infra", "crds"],
    );
    apps.spec.path = Some("./apps/prod".to_string());
    apps.status.last_applied_revision = Some("main@sha1:1111111111111111111111".to_string());
    apps.status.last_attempted_revision = Some("main@sha1:2222222222222222222222".to_string());
    apps.status.inventory = (0..25)
        .map(|i| InventoryEntry {
            id: format!("apps_web{i}_apps_Deployment"),
            version: "v1".to_string(),
        })
        .collect();
    store.insert(apps);

    store.push_event(event("apps", "Warning", "BuildFailed", "kustomize build failed", 3));
}

#[tokio::test]
async fn test_missing_primary_is_error() {
    let (_store, ports) = fixture();
    let report = diagnostician(ports)
        .diagnose_resource(
            ResourceKind::Kustomization,
            "flux-system",
            "ghost",
            &CancellationToken::new(),
        )
        .await;
    assert!(report.is_error);
    assert_eq!(report.text, "Not found: getting Kustomization flux-system/ghost");
}

#[tokio::test]
async fn test_missing_crds_is_guidance_not_error() {
    let (store, ports) = fixture();
    store.fail_kind(
        ResourceKind::HelmRelease,
        StoreError::classify("no matches for kind \"HelmRelease\" in version \"helm.toolkit.fluxcd.io/v2\""),
    );
    let report = diagnostician(ports)
        .diagnose_resource(ResourceKind::HelmRelease, "apps", "redis", &CancellationToken::new())
        .await;
    assert!(!report.is_error);
    assert_eq!(report.text, NOT_INSTALLED_GUIDANCE);
}

#[tokio::test]
async fn test_failing_kustomization_report() {
    let (store, ports) = fixture();
    seed_broken_apps(&store);

    let report = diagnostician(ports)
        .diagnose_resource(
            ResourceKind::Kustomization,
            "flux-system",
            "apps",
            &CancellationToken::new(),
        )
        .await;
    assert!(!report.is_error);
    let text = report.text;

    assert!(text.starts_with(
        "=== Flux Kustomization Diagnosis: apps (namespace: flux-system) ===\n\n"
    ));
    assert!(text.contains("STATUS:              Failed\n"));
    assert!(text.contains("SOURCE:              GitRepository/fleet\n"));
    assert!(text.contains("  Ready           False   kustomize build failed: missing resource (BuildFailed)\n"));
    assert!(text.contains("--- Dependencies ---\n  -> flux-system/infra [Ready]\n  -> flux-system/crds (not found)\n"));
    assert!(text.contains("--- Managed Resources (25) ---\n"));
    assert!(text.contains("  apps_web0_apps_Deployment (v1)\n"));
    assert!(text.contains("  ... and 5 more\n"));
    assert!(!text.contains("apps_web20_apps_Deployment"));
    assert!(text.contains("  Warning  BuildFailed               kustomize build failed (x3)\n"));
    assert!(text.contains("```mermaid\ngraph LR\n"));
    assert!(text.contains("ks_flux_system_infra -.-> ks_flux_system_apps"));

    let findings: Vec<&str> = text
        .lines()
        .skip_while(|line| *line != "FINDINGS:")
        .skip(1)
        .take_while(|line| !line.is_empty())
        .collect();
    assert_eq!(
        findings,
        vec![
            "  [CRITICAL] Reconciliation failed: kustomize build failed: missing resource",
            "  [WARNING] Applied revision (main@sha1:111111111111) differs from attempted revision (main@sha1:222222222222)",
            "  [WARNING] Dependency flux-system/crds not found",
            "  [WARNING] Source GitRepository/fleet is Failed: authentication required",
        ]
    );
    assert!(text.contains(
        "SUGGESTED ACTIONS:\n1. Check the Kustomize overlay at path './apps/prod' for YAML/kustomization errors\n"
    ));
}

#[tokio::test]
async fn test_healthy_kustomization_has_no_findings() {
    let (store, ports) = fixture();
    store.insert(ready(ManagedResource::new(
        ResourceKind::GitRepository,
        "flux-system",
        "fleet",
    )));
    store.insert(sourced_from(
        ready(ManagedResource::new(ResourceKind::Kustomization, "flux-system", "infra")),
        "GitRepository",
        "fleet",
    ));

    let report = diagnostician(ports)
        .diagnose_resource(
            ResourceKind::Kustomization,
            "flux-system",
            "infra",
            &CancellationToken::new(),
        )
        .await;
    assert!(report.text.contains("  No issues found. Kustomization appears healthy.\n"));
    assert!(report.text.contains("  No specific actions needed. Kustomization is healthy.\n"));
    assert!(!report.text.contains("--- Recent Events ---"));
}

#[tokio::test]
async fn test_suspended_release_report() {
    let (store, ports) = fixture();
    store.insert(ready(ManagedResource::new(
        ResourceKind::HelmRepository,
        "apps",
        "bitnami",
    )));
    let mut release = sourced_from(
        ready(ManagedResource::new(ResourceKind::HelmRelease, "apps", "redis")),
        "",
        "bitnami",
    );
    release.spec.suspend = true;
    release.spec.chart = Some(ChartSpec {
        chart: "redis".to_string(),
        version: "18.1.0".to_string(),
    });
    release.status.conditions.push(
        Condition::new(condition::RELEASED, ConditionStatus::False)
            .with_reason("UpgradeFailed")
            .with_message("timed out waiting for the condition"),
    );
    release.status.conditions.push(
        Condition::new(condition::TEST_SUCCESS, ConditionStatus::False)
            .with_reason("Failed")
            .with_message("test pod failed"),
    );
    release.status.history = vec![ReleaseSnapshot {
        version: 4,
        status: "failed".to_string(),
        chart_version: "18.1.0".to_string(),
        app_version: "7.2.0".to_string(),
    }];
    store.insert(release);

    let report = diagnostician(ports)
        .diagnose_resource(ResourceKind::HelmRelease, "apps", "redis", &CancellationToken::new())
        .await;
    let text = report.text;

    assert!(text.contains("STATUS:              Suspended\n"));
    assert!(text.contains("CHART:               redis\n"));
    assert!(text.contains("VERSION:             18.1.0\n"));
    assert!(text.contains("--- Remediation Config ---\n  (defaults)\n"));
    assert!(text.contains("  v4: failed (chart: 18.1.0, app: 7.2.0)\n"));
    assert!(text.contains("  [INFO] HelmRelease is suspended, reconciliation paused\n"));
    assert!(text.contains(
        "  [WARNING] Release issue: UpgradeFailed: timed out waiting for the condition\n"
    ));
    assert!(text.contains("  [WARNING] Helm tests failed: test pod failed\n"));
    assert!(text.contains("1. Resume reconciliation: flux resume helmrelease redis -n apps\n"));
    assert!(text.contains("helmrepo_apps_bitnami --> hr_apps_redis"));
}

#[tokio::test]
async fn test_source_kind_is_unsupported() {
    let (_store, ports) = fixture();
    let report = diagnostician(ports)
        .diagnose_resource(
            ResourceKind::GitRepository,
            "flux-system",
            "fleet",
            &CancellationToken::new(),
        )
        .await;
    assert!(report.is_error);
    assert!(report.text.starts_with("Unsupported resource kind: GitRepository"));
}

#[tokio::test]
async fn test_secondary_failures_degrade_inline() {
    let (store, ports) = fixture();
    seed_broken_apps(&store);
    store.fail_events(StoreError::Forbidden("events".to_string()));
    store.fail_kind(
        ResourceKind::GitRepository,
        StoreError::Other("connection reset".to_string()),
    );

    let report = diagnostician(ports)
        .diagnose_resource(
            ResourceKind::Kustomization,
            "flux-system",
            "apps",
            &CancellationToken::new(),
        )
        .await;
    assert!(!report.is_error);
    assert!(report
        .text
        .contains("--- Recent Events ---\n  (could not fetch events: forbidden: events)\n"));
    assert!(report
        .text
        .contains("[WARNING] Cannot fetch source GitRepository/fleet: connection reset"));
}

#[tokio::test(start_paused = true)]
async fn test_primary_timeout_is_fatal() {
    let (store, ports) = fixture();
    seed_broken_apps(&store);
    store.delay_kind(ResourceKind::Kustomization, Duration::from_secs(120));

    let report = diagnostician(ports)
        .diagnose_resource(
            ResourceKind::Kustomization,
            "flux-system",
            "apps",
            &CancellationToken::new(),
        )
        .await;
    assert!(report.is_error);
    assert_eq!(
        report.text,
        "Timeout: getting Kustomization flux-system/apps. The cluster may be unreachable."
    );
}

#[tokio::test(start_paused = true)]
async fn test_secondary_timeout_degrades() {
    let (store, ports) = fixture();
    seed_broken_apps(&store);
    store.delay_kind(ResourceKind::GitRepository, Duration::from_secs(120));

    let report = diagnostician(ports)
        .diagnose_resource(
            ResourceKind::Kustomization,
            "flux-system",
            "apps",
            &CancellationToken::new(),
        )
        .await;
    assert!(!report.is_error);
    assert!(report
        .text
        .contains("[WARNING] Cannot fetch source GitRepository/fleet: request timed out"));
}

#[tokio::test]
async fn test_cancelled_call_skips_fetches() {
    let (store, ports) = fixture();
    seed_broken_apps(&store);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = diagnostician(ports)
        .diagnose_resource(ResourceKind::Kustomization, "flux-system", "apps", &cancel)
        .await;
    assert!(report.is_error);
    assert_eq!(report.text, "Cancelled: getting Kustomization flux-system/apps");
}

#[tokio::test]
async fn test_system_report() {
    let (store, ports) = fixture();
    seed_broken_apps(&store);
    store.insert(ready(ManagedResource::new(ResourceKind::HelmRelease, "apps", "redis")));
    store.push_pod(pod("source-controller-7d9", true, None));
    store.push_pod(pod("kustomize-controller-5f8", false, Some("CrashLoopBackOff")));

    let report = diagnostician(ports)
        .diagnose_system(&CancellationToken::new())
        .await;
    assert!(!report.is_error);
    let text = report.text;

    assert!(text.starts_with("=== FluxCD System Health Report ===\n\n--- Flux Controllers (flux-system namespace) ---\n"));
    assert!(text.contains("  Pods: 1/2 healthy\n"));
    assert!(text.contains(
        "  [CRITICAL] Controller pod 'kustomize-controller-5f8' is unhealthy: CrashLoopBackOff\n"
    ));
    assert!(text.contains("--- Kustomization Health ---\n  Total: 2  Ready: 1, Failed: 1\n"));
    assert!(text.contains("  [WARNING] 1 Kustomizations not healthy\n    - flux-system/apps: Failed\n"));
    assert!(text.contains("--- HelmRelease Health ---\n  Total: 1  Ready: 1\n"));
    assert!(text.contains("  [WARNING] GitRepository flux-system/fleet: Failed\n"));
    assert!(text.contains("  GitRepository: 1  Failed: 1\n"));
    assert!(text.contains("  Total sources: 1, Unhealthy: 1\n"));
    assert!(text.contains("  [WARNING] 1 warning events in flux-system in the last hour\n"));
    assert!(text.contains("  4 issue(s) found. Review findings above.\n"));
    assert!(text.contains("--- Topology ---\n```mermaid\ngraph LR\n"));
    assert!(text.contains("git_flux_system_fleet --> ks_flux_system_apps"));
}

#[tokio::test]
async fn test_system_report_healthy_cluster() {
    let (store, ports) = fixture();
    store.insert(ready(ManagedResource::new(ResourceKind::GitRepository, "flux-system", "fleet")));
    store.push_pod(pod("source-controller-7d9", true, None));
    let mut stale = event("fleet", "Warning", "GitOperationFailed", "old failure", 1);
    stale.last_seen = Some(Utc::now() - chrono::Duration::hours(3));
    store.push_event(stale);

    let report = diagnostician(ports)
        .diagnose_system(&CancellationToken::new())
        .await;
    assert!(report.text.contains("  None in the last hour\n"));
    assert!(report.text.contains("  FluxCD system appears healthy. No issues found.\n"));
}

#[tokio::test]
async fn test_system_report_survives_huge_warning_window() {
    let (store, ports) = fixture();
    store.push_pod(pod("source-controller-7d9", true, None));
    let mut ancient = event("fleet", "Warning", "GitOperationFailed", "old failure", 1);
    ancient.last_seen = Some(Utc::now() - chrono::Duration::days(3650));
    store.push_event(ancient);

    let config = FluxdocConfig {
        warning_window_minutes: i64::MAX / 1000,
        ..FluxdocConfig::default()
    };
    let report = Diagnostician::new(ports, config)
        .diagnose_system(&CancellationToken::new())
        .await;
    assert!(!report.is_error);
    assert!(report.text.contains("  [WARNING] 1 warning events in flux-system in the last "));
    assert!(report.text.contains("  1 issue(s) found."));
}

#[tokio::test]
async fn test_system_report_without_flux() {
    let (store, ports) = fixture();
    store.fail_kind(
        ResourceKind::Kustomization,
        StoreError::classify("the server could not find the requested resource"),
    );
    let report = diagnostician(ports)
        .diagnose_system(&CancellationToken::new())
        .await;
    assert!(!report.is_error);
    assert_eq!(report.text, NOT_INSTALLED_GUIDANCE);
}

#[tokio::test]
async fn test_system_report_without_controller_pods() {
    let (_store, ports) = fixture();
    let report = diagnostician(ports)
        .diagnose_system(&CancellationToken::new())
        .await;
    assert!(report.text.contains(
        "[CRITICAL] No pods found in flux-system namespace. FluxCD may not be installed\n"
    ));
    assert!(report.text.contains("  1 issue(s) found."));
}

#[tokio::test]
async fn test_kustomization_tree() {
    let (store, ports) = fixture();
    seed_broken_apps(&store);
    store.insert(depends_on(
        ready(ManagedResource::new(ResourceKind::Kustomization, "flux-system", "infra")),
        &["apps"],
    ));
    let config = FluxdocConfig {
        tree_inventory_limit: 20,
        ..FluxdocConfig::default()
    };

    let report = Diagnostician::new(ports, config)
        .resource_tree(
            ResourceKind::Kustomization,
            "flux-system",
            "apps",
            &CancellationToken::new(),
        )
        .await;
    let text = report.text;

    assert!(text.starts_with(
        "=== Flux Resource Tree: flux-system/apps (Kustomization) ===\n\nSource: GitRepository/fleet\n  -> Kustomization: flux-system/apps [Failed]\n    -> flux-system/infra [Ready]\n      -> flux-system/apps (circular ref, skipped)\n    -> flux-system/crds (not found)\n"
    ));
    assert!(text.contains("  Managed Resources (25):\n    apps_web0_apps_Deployment\n"));
    assert!(text.contains("    ... and 5 more\n"));
    assert!(text.contains("git_flux_system_fleet --> ks_flux_system_apps"));
    assert!(text.contains("ks_flux_system_infra -.-> ks_flux_system_apps"));
}

#[tokio::test]
async fn test_release_tree_in_dot() {
    let (store, ports) = fixture();
    let mut release = sourced_from(
        ready(ManagedResource::new(ResourceKind::HelmRelease, "apps", "redis")),
        "HelmRepository",
        "bitnami",
    );
    release.spec.chart = Some(ChartSpec {
        chart: "redis".to_string(),
        version: "18.1.0".to_string(),
    });
    store.insert(release);
    let config = FluxdocConfig {
        diagram: fluxdoc_domain::DiagramFormat::Dot,
        ..FluxdocConfig::default()
    };

    let report = Diagnostician::new(ports, config)
        .resource_tree(ResourceKind::HelmRelease, "apps", "redis", &CancellationToken::new())
        .await;
    assert!(report.text.contains("Chart: redis@18.1.0\n  -> HelmRelease: apps/redis [Ready]\n"));
    assert!(report.text.contains("```dot\ndigraph flux {\n"));
    assert!(report.text.contains("  \"helmrepo_apps_bitnami\" -> \"hr_apps_redis\";\n"));
}

#[tokio::test]
async fn test_tree_for_source_kind_is_unsupported() {
    let (_store, ports) = fixture();
    let report = diagnostician(ports)
        .resource_tree(ResourceKind::Bucket, "flux-system", "assets", &CancellationToken::new())
        .await;
    assert!(report.is_error);
    assert!(report.text.contains("Unsupported resource kind: Bucket"));
}
