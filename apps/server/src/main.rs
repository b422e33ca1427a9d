//! `testbed-server`: runs the resolution server until interrupted.

mod cli;
mod config;

use anyhow::Context;
use clap::Parser;
use testbed_resolver::ResolverChain;
use testbed_server::{ServerState, TestResourcesServer, write_discovery_file};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log = testbed_log::auto_init().context("failed to initialize logging")?;

    let config = config::load(cli.config.as_deref(), &cli.overrides())
        .context("failed to load configuration")?;
    tracing::debug!(
        bind = %config.bind,
        token = config.effective_token().is_some(),
        static_properties = config.static_properties.len(),
        "Configuration loaded"
    );

    let state = ServerState::from_config(&config, ResolverChain::new());
    let server = TestResourcesServer::bind(&config, state).await?;

    if let Some(path) = &cli.discovery_file {
        write_discovery_file(path, &server.uri(), config.effective_token())?;
    }

    server.serve(shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
