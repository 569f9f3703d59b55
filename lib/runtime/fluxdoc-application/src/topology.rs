//! Directed graph of sources, resources and ordering edges, rendered as
//! Mermaid or Graphviz source.

use fluxdoc_domain::{DiagramFormat, ManagedResource, ResourceId, ResourceKind, StatusView};

use crate::dependency::DependencyEdge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    /// Source feeds consumer.
    Solid,
    /// Dependency must be ready before dependent.
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyNode {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEdge {
    pub from: String,
    pub to: String,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: Vec<TopologyNode>,
    edges: Vec<TopologyEdge>,
}

/// Replaces characters diagram syntaxes reject in identifiers.
/// Distinct ids may collide after this; that is accepted.
pub fn normalize_id(raw: &str) -> String {
    raw.chars()
        .map(|ch| match ch {
            '/' | '-' | '.' | ':' => '_',
            other => other,
        })
        .collect()
}

pub fn node_key(kind: ResourceKind, id: &ResourceId) -> String {
    normalize_id(&format!("{}_{}_{}", kind.node_prefix(), id.namespace, id.name))
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[TopologyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TopologyEdge] {
        &self.edges
    }

    /// Adds or relabels a node. Keys are normalized first.
    pub fn add_node(&mut self, key: &str, label: impl Into<String>) -> String {
        let key = normalize_id(key);
        let label = label.into();
        match self.nodes.iter_mut().find(|node| node.key == key) {
            Some(node) => node.label = label,
            None => self.nodes.push(TopologyNode {
                key: key.clone(),
                label,
            }),
        }
        key
    }

    pub fn add_edge(&mut self, from: &str, to: &str, style: EdgeStyle) {
        let edge = TopologyEdge {
            from: normalize_id(from),
            to: normalize_id(to),
            style,
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    /// Node labelled with kind, name and current health.
    pub fn add_resource(&mut self, resource: &ManagedResource) -> String {
        let key = node_key(resource.kind, &resource.id);
        let label = format!("{}: {}\n{}", resource.kind, resource.name(), resource.health());
        self.add_node(&key, label)
    }

    /// Solid edge from the resource's source, adding a placeholder source
    /// node when the source itself was not added.
    pub fn link_source(&mut self, resource: &ManagedResource) {
        let (Some(kind), Some(source), Some(namespace)) = (
            resource.source_kind(),
            resource.source_ref(),
            resource.source_namespace(),
        ) else {
            return;
        };
        let source_id = ResourceId::new(namespace, source.name.clone());
        let source_key = node_key(kind, &source_id);
        if !self.nodes.iter().any(|node| node.key == source_key) {
            self.add_node(&source_key, format!("{kind}: {}", source.name));
        }
        let consumer = node_key(resource.kind, &resource.id);
        self.add_edge(&source_key, &consumer, EdgeStyle::Solid);
    }

    pub fn link_dependencies(&mut self, kind: ResourceKind, edges: &[DependencyEdge]) {
        for edge in edges {
            self.add_edge(
                &node_key(kind, &edge.dependency),
                &node_key(kind, &edge.dependent),
                EdgeStyle::Dashed,
            );
        }
    }

    /// Whole-cluster view: every resource, source edges for consumers and
    /// dashed edges for declared `dependsOn`.
    pub fn for_cluster(resources: &[ManagedResource]) -> Self {
        let mut topology = Self::new();
        for resource in resources.iter().filter(|resource| resource.kind.is_source()) {
            topology.add_resource(resource);
        }
        for resource in resources.iter().filter(|resource| !resource.kind.is_source()) {
            let key = topology.add_resource(resource);
            topology.link_source(resource);
            for dependency in resource.dependency_ids() {
                topology.add_edge(
                    &node_key(resource.kind, &dependency),
                    &key,
                    EdgeStyle::Dashed,
                );
            }
        }
        topology
    }

    pub fn render(&self, format: DiagramFormat) -> String {
        match format {
            DiagramFormat::Mermaid => self.to_mermaid(),
            DiagramFormat::Dot => self.to_dot(),
        }
    }

    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph LR\n");
        for node in &self.nodes {
            let label = node.label.replace('"', "#quot;").replace('\n', "<br/>");
            out.push_str(&format!("  {}[\"{}\"]\n", node.key, label));
        }
        for edge in &self.edges {
            let arrow = match edge.style {
                EdgeStyle::Solid => "-->",
                EdgeStyle::Dashed => "-.->",
            };
            out.push_str(&format!("  {} {} {}\n", edge.from, arrow, edge.to));
        }
        out
    }

    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph flux {\n");
        out.push_str("  rankdir=LR;\n");
        out.push_str("  node [shape=box];\n");
        for node in &self.nodes {
            let label = node.label.replace('"', "\\\"").replace('\n', "\\n");
            out.push_str(&format!("  \"{}\" [label=\"{}\"];\n", node.key, label));
        }
        for edge in &self.edges {
            match edge.style {
                EdgeStyle::Solid => {
                    out.push_str(&format!("  \"{}\" -> \"{}\";\n", edge.from, edge.to));
                }
                EdgeStyle::Dashed => {
                    out.push_str(&format!(
                        "  \"{}\" -> \"{}\" [style=dashed];\n",
                        edge.from, edge.to
                    ));
                }
            }
        }
        out.push_str("}\n");
        out
    }
}
