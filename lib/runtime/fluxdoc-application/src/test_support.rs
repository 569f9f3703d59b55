use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use fluxdoc_domain::{
    Condition, ConditionStatus, DependencyRef, ManagedResource, SourceRef, condition,
};
use fluxdoc_ports::{InMemoryClusterStore, PortSet};

use crate::fetch::FetchScope;

pub fn fixture() -> (InMemoryClusterStore, PortSet) {
    let store = InMemoryClusterStore::new();
    let ports = PortSet::from_store(Arc::new(store.clone()));
    (store, ports)
}

pub fn scope() -> FetchScope {
    FetchScope::new(Duration::from_secs(30), CancellationToken::new())
}

pub fn ready(mut resource: ManagedResource) -> ManagedResource {
    resource.generation = 1;
    resource.status.observed_generation = 1;
    resource.status.conditions = vec![
        Condition::new(condition::READY, ConditionStatus::True)
            .with_reason("ReconciliationSucceeded")
            .with_message("Applied revision: main@sha1:abc"),
    ];
    resource
}

pub fn failing(mut resource: ManagedResource, reason: &str, message: &str) -> ManagedResource {
    resource.generation = 1;
    resource.status.observed_generation = 1;
    resource.status.conditions = vec![
        Condition::new(condition::READY, ConditionStatus::False)
            .with_reason(reason)
            .with_message(message),
    ];
    resource
}

pub fn depends_on(mut resource: ManagedResource, names: &[&str]) -> ManagedResource {
    resource.spec.depends_on = names
        .iter()
        .map(|name| DependencyRef {
            name: (*name).to_string(),
            namespace: None,
        })
        .collect();
    resource
}

pub fn sourced_from(mut resource: ManagedResource, kind: &str, name: &str) -> ManagedResource {
    resource.spec.source_ref = Some(SourceRef {
        kind: kind.to_string(),
        name: name.to_string(),
        namespace: None,
    });
    resource
}
