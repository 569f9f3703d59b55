pub mod adapters;

pub use adapters::FluxdocBackend;
pub use fluxdoc_application::{CancellationToken, DiagnosticReport, Diagnostician};
pub use fluxdoc_domain::FluxdocConfig;
