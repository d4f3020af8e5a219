mod config;
mod seed;
mod wiring;

use std::error::Error;

use api::AppState;
use tokio::{net::TcpListener, sync::watch};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    runtime::logging::init_tracing()?;

    let config = config::Config::from_env()?;
    let store = wiring::build_store(&config).await?;
    let state = AppState::new();
    let scheduler = wiring::build_scheduler(&config, store, state.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let simulation = tokio::spawn(scheduler.run(shutdown_rx));

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %listener.local_addr()?, "stock simulation server listening");
    axum::serve(listener, wiring::build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The receiver may already be gone if the scheduler task panicked.
    let _ = shutdown_tx.send(true);
    let report = simulation.await?;
    info!(
        ticks = report.ticks,
        failed_ticks = report.failed_ticks,
        "server stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
