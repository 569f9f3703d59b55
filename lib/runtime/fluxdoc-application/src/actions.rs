use fluxdoc_domain::{
    HealthStatus, ManagedResource, ResourceKind, StatusView, condition, condition_reason,
};

/// Operator next steps keyed on kind, health and the failing reason.
pub fn suggested_actions(resource: &ManagedResource, health: HealthStatus) -> Vec<String> {
    let mut actions = Vec::new();

    if health.is_unhealthy() {
        let reason = failure_reason(resource, health);
        actions.push(match resource.kind {
            ResourceKind::Kustomization => kustomization_action(resource, reason),
            ResourceKind::HelmRelease => release_action(reason),
            kind => format!("Check Flux {} logs for more details", kind.controller()),
        });
    }

    if resource.suspended() {
        actions.push(format!(
            "Resume reconciliation: flux resume {} {} -n {}",
            resource.kind.cli_name(),
            resource.name(),
            resource.namespace()
        ));
    }

    actions
}

fn failure_reason(resource: &ManagedResource, health: HealthStatus) -> &str {
    let ready = condition_reason(resource.conditions(), condition::READY);
    if health == HealthStatus::Stalled {
        let stalled = condition_reason(resource.conditions(), condition::STALLED);
        if !stalled.is_empty() {
            return stalled;
        }
    }
    ready
}

fn kustomization_action(resource: &ManagedResource, reason: &str) -> String {
    match reason {
        "BuildFailed" => format!(
            "Check the Kustomize overlay at path '{}' for YAML/kustomization errors",
            resource.spec.path.as_deref().unwrap_or_default()
        ),
        "HealthCheckFailed" => {
            "Inspect managed resources for readiness issues (describe the failing workloads)"
                .to_string()
        }
        "DependencyNotReady" => {
            "Fix failing dependencies before this Kustomization can reconcile".to_string()
        }
        "ArtifactFailed" => match resource.source_ref() {
            Some(source) => format!(
                "Check source {}/{}, its artifact could not be fetched",
                source.kind, source.name
            ),
            None => "Check the source artifact for this Kustomization".to_string(),
        },
        _ => "Check Flux kustomize-controller logs for more details".to_string(),
    }
}

fn release_action(reason: &str) -> String {
    if reason.contains("Install") {
        "Check Helm chart values and templates for install errors".to_string()
    } else if reason.contains("Upgrade") {
        "Check Helm chart changes, the upgrade may have failed. Review release history above"
            .to_string()
    } else {
        "Check Flux helm-controller logs for more details".to_string()
    }
}
