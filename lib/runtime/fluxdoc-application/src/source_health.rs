use tracing::debug;

use fluxdoc_domain::{
    Finding, HealthStatus, ResourceKind, StatusView, condition, condition_message,
};
use fluxdoc_ports::PortSet;

use crate::fetch::FetchScope;

/// Checks an upstream source and reports at most one warning.
///
/// Fetch failures become a warning instead of an error so the caller's report
/// always completes. Ready and suspended sources produce nothing.
pub async fn check_source_health(
    ports: &PortSet,
    scope: &FetchScope,
    kind: ResourceKind,
    name: &str,
    namespace: &str,
) -> Option<Finding> {
    if !kind.is_source() {
        debug!(%kind, name, "not a source kind, skipping source check");
        return None;
    }

    let action = format!("getting {kind} {namespace}/{name}");
    let source = match scope
        .run(&action, ports.resources.get(kind, namespace, name))
        .await
    {
        Ok(source) => source,
        Err(error) => {
            return Some(Finding::warning(format!(
                "Cannot fetch source {kind}/{name}: {error}"
            )));
        }
    };

    let health = source.health();
    if matches!(health, HealthStatus::Ready | HealthStatus::Suspended) {
        return None;
    }

    let message = condition_message(source.conditions(), condition::READY);
    Some(Finding::warning(format!(
        "Source {kind}/{name} is {health}: {message}"
    )))
}
