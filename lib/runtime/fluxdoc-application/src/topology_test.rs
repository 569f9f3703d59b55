use fluxdoc_domain::{DiagramFormat, ManagedResource, ResourceId, ResourceKind};

use crate::dependency::DependencyEdge;
use crate::test_support::{depends_on, failing, ready, sourced_from};
use crate::topology::{EdgeStyle, Topology, node_key, normalize_id};

#[test]
fn test_normalize_replaces_illegal_characters() {
    assert_eq!(normalize_id("ks_flux-system/apps.v1:x"), "ks_flux_system_apps_v1_x");
}

#[test]
fn test_normalization_collisions_are_not_detected() {
    let mut topology = Topology::new();
    topology.add_node("a-b", "first");
    topology.add_node("a.b", "second");
    assert_eq!(topology.nodes().len(), 1);
    assert_eq!(topology.nodes()[0].label, "second");
}

#[test]
fn test_cluster_topology_has_both_edge_styles() {
    let git = ready(ManagedResource::new(ResourceKind::GitRepository, "flux-system", "fleet"));
    let infra = sourced_from(
        ready(ManagedResource::new(ResourceKind::Kustomization, "flux-system", "infra")),
        "GitRepository",
        "fleet",
    );
    let apps = depends_on(
        sourced_from(
            failing(
                ManagedResource::new(ResourceKind::Kustomization, "flux-system", "apps"),
                "BuildFailed",
                "oops",
            ),
            "GitRepository",
            "fleet",
        ),
        &["infra"],
    );

    let topology = Topology::for_cluster(&[apps, infra, git]);
    let mermaid = topology.to_mermaid();

    assert!(mermaid.starts_with("graph LR\n"));
    assert!(mermaid.contains("  git_flux_system_fleet[\"GitRepository: fleet<br/>Ready\"]\n"));
    assert!(mermaid.contains("  ks_flux_system_apps[\"Kustomization: apps<br/>Failed\"]\n"));
    assert!(mermaid.contains("  git_flux_system_fleet --> ks_flux_system_apps\n"));
    assert!(mermaid.contains("  ks_flux_system_infra -.-> ks_flux_system_apps\n"));
}

#[test]
fn test_release_without_kind_links_helm_repository() {
    let release = sourced_from(
        ready(ManagedResource::new(ResourceKind::HelmRelease, "apps", "redis")),
        "",
        "bitnami",
    );
    let topology = Topology::for_cluster(&[release]);
    assert_eq!(topology.nodes().len(), 2);
    assert_eq!(topology.edges()[0].from, "helmrepo_apps_bitnami");
    assert_eq!(topology.edges()[0].style, EdgeStyle::Solid);
}

#[test]
fn test_dot_rendering() {
    let mut topology = Topology::new();
    let a = ResourceId::new("ns", "a");
    let b = ResourceId::new("ns", "b");
    topology.add_node(&node_key(ResourceKind::Kustomization, &a), "a\nReady");
    topology.add_node(&node_key(ResourceKind::Kustomization, &b), "b\nReady");
    topology.link_dependencies(
        ResourceKind::Kustomization,
        &[DependencyEdge {
            dependency: a,
            dependent: b,
        }],
    );

    let dot = topology.render(DiagramFormat::Dot);
    assert!(dot.starts_with("digraph flux {\n  rankdir=LR;\n"));
    assert!(dot.contains("  \"ks_ns_a\" [label=\"a\\nReady\"];\n"));
    assert!(dot.contains("  \"ks_ns_a\" -> \"ks_ns_b\" [style=dashed];\n"));
    assert!(dot.ends_with("}\n"));
}

#[test]
fn test_duplicate_edges_collapse() {
    let mut topology = Topology::new();
    topology.add_edge("a", "b", EdgeStyle::Solid);
    topology.add_edge("a", "b", EdgeStyle::Solid);
    topology.add_edge("a", "b", EdgeStyle::Dashed);
    assert_eq!(topology.edges().len(), 2);
}
