use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fluxdoc_domain::{DiagramFormat, ResourceKind};

#[derive(Parser, Debug)]
#[command(name = "fluxdoc", version, about = "Read-only diagnostics for Flux GitOps resources")]
pub struct Cli {
    #[arg(long, global = true, env = "FLUXDOC_CONFIG_PATH", help = "Path to the YAML config")]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "FLUXDOC_FIXTURE",
        help = "Serve reports from a YAML cluster snapshot instead of a live cluster"
    )]
    pub fixture: Option<PathBuf>,
    #[arg(long, global = true, help = "Kubeconfig context to connect with")]
    pub context: Option<String>,
    #[arg(long, global = true, value_parser = parse_diagram, help = "Diagram syntax: mermaid or dot")]
    pub diagram: Option<DiagramFormat>,
    #[arg(short, long, global = true, help = "Log debug output to stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Diagnose one Kustomization or HelmRelease.
    Diagnose {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
    /// Health report for the whole Flux installation.
    System,
    /// Source, dependencies and managed objects of one resource.
    Tree {
        #[arg(long, value_parser = parse_kind, default_value = "kustomization")]
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
}

fn parse_kind(raw: &str) -> Result<ResourceKind, String> {
    raw.parse().map_err(|error| format!("{error}"))
}

fn parse_diagram(raw: &str) -> Result<DiagramFormat, String> {
    raw.parse().map_err(|error| format!("{error}"))
}
