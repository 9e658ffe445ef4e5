//! Status Service Binary
//!
//! Loads configuration, initializes logging, starts the background tasks and
//! serves the HTTP API until Ctrl+C or SIGTERM.

use status_service::{
    api::AppState,
    config::Config,
    keep_alive::KeepAlivePinger,
    observability::init_observability,
    server::start_server,
    shutdown::ShutdownCoordinator,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(&config_path)?;

    init_observability(&config.logging.level, &config.logging.format);
    info!("Starting Status Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded from {} (environment: {})",
        config_path,
        config.environment.as_str()
    );

    let keep_alive_active = config.keep_alive_active();
    let keep_alive = KeepAlivePinger::from_config(&config.keep_alive)?;
    let state = AppState::new(config);
    let shutdown = Arc::new(ShutdownCoordinator::new());

    state
        .rate_limiter
        .clone()
        .start_cleanup_task(shutdown.subscribe());
    info!(
        "Rate limiter initialized: {}",
        state.config.rate_limit.describe()
    );

    match keep_alive {
        Some(pinger) if keep_alive_active => {
            Arc::new(pinger).start(shutdown.subscribe());
        }
        _ => info!("Keep-alive is disabled"),
    }

    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    start_server(state, shutdown.subscribe()).await?;
    Ok(())
}
