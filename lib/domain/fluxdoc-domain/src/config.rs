use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    #[default]
    Mermaid,
    Dot,
}

impl fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mermaid => f.write_str("mermaid"),
            Self::Dot => f.write_str("dot"),
        }
    }
}

impl FromStr for DiagramFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "mermaid" => Ok(Self::Mermaid),
            "dot" | "graphviz" => Ok(Self::Dot),
            other => anyhow::bail!("unknown diagram format: {other}"),
        }
    }
}

/// Tunables for the diagnostic engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluxdocConfig {
    pub controller_namespace: String,
    pub fetch_timeout_secs: u64,
    pub max_dependency_depth: usize,
    pub inventory_display_limit: usize,
    pub tree_inventory_limit: usize,
    pub warning_window_minutes: i64,
    pub max_events: usize,
    pub diagram: DiagramFormat,
}

impl Default for FluxdocConfig {
    fn default() -> Self {
        Self {
            controller_namespace: "flux-system".to_string(),
            fetch_timeout_secs: 30,
            max_dependency_depth: 10,
            inventory_display_limit: 20,
            tree_inventory_limit: 30,
            warning_window_minutes: 60,
            max_events: 50,
            diagram: DiagramFormat::Mermaid,
        }
    }
}

impl FluxdocConfig {
    /// Reads YAML config. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
