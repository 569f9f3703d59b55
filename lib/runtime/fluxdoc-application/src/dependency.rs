//! Bounded walk over declared `dependsOn` edges.
//!
//! The visited set spans the whole trace rather than a single path, so a
//! dependency shared by two branches is expanded on the first branch only and
//! reported as a skipped reference on the others.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use fluxdoc_domain::{
    HealthStatus, ManagedResource, ResourceId, ResourceKind, StatusView, StoreError,
};
use fluxdoc_ports::PortSet;

use crate::fetch::FetchScope;

pub const DEFAULT_MAX_DEPTH: usize = 10;

/// One rendered line of a dependency trace. `depth` is 1 for direct
/// dependencies of the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLine {
    Resolved {
        id: ResourceId,
        health: HealthStatus,
        depth: usize,
    },
    Circular {
        id: ResourceId,
        depth: usize,
    },
    NotFound {
        id: ResourceId,
        depth: usize,
    },
    Unreachable {
        id: ResourceId,
        depth: usize,
        error: StoreError,
    },
}

impl TraceLine {
    pub fn id(&self) -> &ResourceId {
        match self {
            Self::Resolved { id, .. }
            | Self::Circular { id, .. }
            | Self::NotFound { id, .. }
            | Self::Unreachable { id, .. } => id,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Resolved { depth, .. }
            | Self::Circular { depth, .. }
            | Self::NotFound { depth, .. }
            | Self::Unreachable { depth, .. } => *depth,
        }
    }
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-> {}", self.id())?;
        match self {
            Self::Resolved { health, .. } => write!(f, " [{health}]"),
            Self::Circular { .. } => f.write_str(" (circular ref, skipped)"),
            Self::NotFound { .. } => f.write_str(" (not found)"),
            Self::Unreachable { error, .. } => write!(f, " (could not fetch: {error})"),
        }
    }
}

/// Ordering edge: `dependency` must be ready before `dependent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub dependency: ResourceId,
    pub dependent: ResourceId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTrace {
    pub lines: Vec<TraceLine>,
    pub edges: Vec<DependencyEdge>,
}

impl DependencyTrace {
    /// Resolved dependencies that are not Ready.
    pub fn unhealthy(&self) -> impl Iterator<Item = (&ResourceId, HealthStatus)> {
        self.lines.iter().filter_map(|line| match line {
            TraceLine::Resolved { id, health, .. } if *health != HealthStatus::Ready => {
                Some((id, *health))
            }
            _ => None,
        })
    }

    /// Dependencies that could not be fetched at all.
    pub fn missing(&self) -> impl Iterator<Item = &TraceLine> {
        self.lines.iter().filter(|line| {
            matches!(
                line,
                TraceLine::NotFound { .. } | TraceLine::Unreachable { .. }
            )
        })
    }

    /// Indented text lines; each depth level adds two spaces to `base`.
    pub fn render_lines(&self, base: &str) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| format!("{base}{}{line}", "  ".repeat(line.depth())))
            .collect()
    }
}

struct Frame {
    owner: ResourceId,
    dependencies: Vec<ResourceId>,
    next: usize,
    depth: usize,
}

pub struct DependencyTracer<'a> {
    ports: &'a PortSet,
    scope: &'a FetchScope,
    max_depth: usize,
}

impl<'a> DependencyTracer<'a> {
    pub fn new(ports: &'a PortSet, scope: &'a FetchScope) -> Self {
        Self {
            ports,
            scope,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Depth-first trace from `root`. Dependencies are looked up as the
    /// root's kind.
    pub async fn trace(&self, root: &ManagedResource) -> DependencyTrace {
        let kind = root.kind;
        let mut trace = DependencyTrace::default();
        if self.max_depth == 0 {
            return trace;
        }

        let mut visited = BTreeSet::from([root.id.clone()]);
        let mut stack = vec![Frame {
            owner: root.id.clone(),
            dependencies: root.dependency_ids(),
            next: 0,
            depth: 1,
        }];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let Some(id) = frame.dependencies.get(frame.next).cloned() else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let depth = frame.depth;
            let owner = frame.owner.clone();

            if !visited.insert(id.clone()) {
                trace.lines.push(TraceLine::Circular { id, depth });
                continue;
            }

            match self.fetch(kind, &id).await {
                Ok(resource) => {
                    let health = resource.health();
                    trace.lines.push(TraceLine::Resolved {
                        id: id.clone(),
                        health,
                        depth,
                    });
                    trace.edges.push(DependencyEdge {
                        dependency: id.clone(),
                        dependent: owner,
                    });
                    let dependencies = resource.dependency_ids();
                    if depth < self.max_depth && !dependencies.is_empty() {
                        stack.push(Frame {
                            owner: id,
                            dependencies,
                            next: 0,
                            depth: depth + 1,
                        });
                    }
                }
                Err(StoreError::NotFound) => {
                    trace.lines.push(TraceLine::NotFound { id, depth });
                }
                Err(StoreError::Cancelled) => {
                    debug!(root = %root.id, "dependency trace cancelled");
                    trace.lines.push(TraceLine::Unreachable {
                        id,
                        depth,
                        error: StoreError::Cancelled,
                    });
                    break;
                }
                Err(error) => {
                    trace.lines.push(TraceLine::Unreachable { id, depth, error });
                }
            }
        }

        trace
    }

    async fn fetch(&self, kind: ResourceKind, id: &ResourceId) -> Result<ManagedResource, StoreError> {
        let action = format!("getting {kind} {id}");
        self.scope
            .run(&action, self.ports.resources.get(kind, &id.namespace, &id.name))
            .await
    }
}
