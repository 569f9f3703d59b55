use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use fluxdoc_application::{CancellationToken, DiagnosticReport, Diagnostician};
use fluxdoc_domain::FluxdocConfig;

use crate::cli::{Cli, Command};

/// Loads `.env` from the working directory when present.
pub fn load_env() {
    if let Ok(path) = dotenv::dotenv() {
        debug!(path = %path.display(), "loaded environment file");
    }
}

/// Explicit path (flag or `FLUXDOC_CONFIG_PATH`), then `$HOME/.fluxdoc`,
/// then the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    resolve_config_path(explicit, env::var("HOME").ok())
}

fn resolve_config_path(explicit: Option<&Path>, home: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(home) = home {
        return Path::new(&home).join(".fluxdoc").join("config.yaml");
    }
    PathBuf::from("fluxdoc-config.yaml")
}

/// Config file merged with command-line overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<FluxdocConfig> {
    let path = config_path(cli.config.as_deref());
    let mut config = FluxdocConfig::load_from_path(&path)?;
    if let Some(diagram) = cli.diagram {
        config.diagram = diagram;
    }
    debug!(path = %path.display(), ?config, "configuration loaded");
    Ok(config)
}

pub async fn dispatch(
    command: &Command,
    diagnostician: &Diagnostician,
    cancel: &CancellationToken,
) -> DiagnosticReport {
    match command {
        Command::Diagnose {
            kind,
            namespace,
            name,
        } => {
            diagnostician
                .diagnose_resource(*kind, namespace, name, cancel)
                .await
        }
        Command::System => diagnostician.diagnose_system(cancel).await,
        Command::Tree {
            kind,
            namespace,
            name,
        } => diagnostician.resource_tree(*kind, namespace, name, cancel).await,
    }
}
