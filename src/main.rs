use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use usergroup_api::config::{self, StorageBackend};
use usergroup_api::routes;
use usergroup_api::shutdown::{self, ShutdownCoordinator};
use usergroup_api::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "usergroup-api", version, about = "User and group management API")]
struct Args {
    /// Listen port (overrides APP_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Storage backend (overrides APP_STORAGE)
    #[arg(long, value_enum)]
    storage: Option<StorageBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    shutdown::install_panic_hook();

    let args = Args::parse();

    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(storage) = args.storage {
        config.storage = storage;
    }
    config.validate().context("invalid configuration")?;

    tracing::info!(
        "Starting usergroup-api in {:?} mode with {:?} storage",
        config.environment,
        config.storage
    );

    let state = AppState::build(&config)
        .await
        .context("failed to initialise application state")?;
    let storage = state.storage.clone();
    let app = routes::app(state, &config);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    let mut coordinator = ShutdownCoordinator::new();
    let mut stop = coordinator.subscribe();
    let reporter = coordinator.fatal_reporter();

    coordinator.watch_server(tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await;
        if let Err(e) = result {
            reporter.report(format!("HTTP server failed: {}", e));
        }
    }));

    let reason = coordinator.wait_for_trigger().await;
    let status = coordinator
        .drain(
            &reason,
            &storage,
            Duration::from_secs(config.server.shutdown_grace_secs),
        )
        .await;

    Ok(ExitCode::from(status))
}
