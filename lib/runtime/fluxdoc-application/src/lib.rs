//! Diagnostic engine: source checks, dependency tracing, topology and reports.

pub mod actions;
pub mod dependency;
pub mod diagnose;
pub mod fetch;
pub mod report;
pub mod source_health;
pub mod topology;

#[cfg(test)]
mod diagnose_test;
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod topology_test;

pub use dependency::{DEFAULT_MAX_DEPTH, DependencyEdge, DependencyTrace, DependencyTracer, TraceLine};
pub use diagnose::Diagnostician;
pub use fetch::FetchScope;
pub use report::{DiagnosticReport, NOT_INSTALLED_GUIDANCE};
pub use source_health::check_source_health;
pub use tokio_util::sync::CancellationToken;
pub use topology::{EdgeStyle, Topology};
