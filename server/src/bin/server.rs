//! Headless server binary.
//!
//! Serves the web form, the JSON API and live-preview WebSockets until
//! Ctrl+C.

use qr_studio_lib::app::SharedState;
use qr_studio_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, settings) = qr_studio_lib::init_foundation()?;
    tracing::info!("Starting QR Studio");

    let state = SharedState::new(config, settings);

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tracing::info!(
        port = state.server_port(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    if let Err(e) = server_handle.await {
        tracing::error!("Server task failed: {e}");
    }
    Ok(())
}
