//! HTTP server startup

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{build_router, AppState};
use crate::error::{Result, ServiceError};
use crate::shutdown::ShutdownNotifier;

/// Address the server binds to
pub fn bind_address(state: &AppState) -> Result<SocketAddr> {
    let server = &state.config.server;
    format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|_| {
            ServiceError::Config(format!(
                "Invalid bind address {}:{}",
                server.host, server.port
            ))
        })
}

/// Bind the configured address and serve until `shutdown` fires
pub async fn start_server(state: AppState, shutdown: ShutdownNotifier) -> Result<()> {
    let addr = bind_address(&state)?;
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, shutdown).await
}

/// Serve on an already bound listener until `shutdown` fires
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: ShutdownNotifier,
) -> Result<()> {
    let app: Router = build_router(state);
    let addr = listener.local_addr()?;
    let port = addr.port();

    info!("Server listening on {}", addr);
    info!("Dashboard: http://localhost:{}/dashboard", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Metrics: http://localhost:{}/metrics", port);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown.wait())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
