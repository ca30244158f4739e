pub mod api;
pub mod assets;
pub mod router;
pub mod websocket;

use anyhow::Result;
use tokio::net::TcpListener;

use crate::app::SharedState;

/// Bind the configured address and serve until shutdown.
pub async fn start_server(state: SharedState) -> Result<()> {
    let addr = state.config().bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("QR Studio listening on http://{}", addr);
    serve(listener, state).await
}

/// Serve the HTTP + WebSocket router on an already-bound listener.
pub async fn serve(listener: TcpListener, state: SharedState) -> Result<()> {
    let shutdown_token = state.shutdown_token().clone();
    let app = router::create_router(state);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
