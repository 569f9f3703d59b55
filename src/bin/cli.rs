use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

use fluxdoc::{CancellationToken, FluxdocBackend};
use fluxdoc_ui_terminal::{Cli, dispatch, init_logging, load_config, load_env};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_env();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let backend = match &cli.fixture {
        Some(path) => FluxdocBackend::from_fixture(path)?,
        None => FluxdocBackend::connect(cli.context.as_deref()).await?,
    };
    let diagnostician = backend.diagnostician(config);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling outstanding requests");
            on_interrupt.cancel();
        }
    });

    let report = dispatch(&cli.command, &diagnostician, &cancel).await;
    if report.is_error {
        eprintln!("{}", report.text);
        return Ok(ExitCode::FAILURE);
    }
    print!("{}", report.text);
    Ok(ExitCode::SUCCESS)
}
