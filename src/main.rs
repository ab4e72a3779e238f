//! Lucid Journal server binary.

use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lucid_journal::config::ServerConfig;
use lucid_journal::handlers::router::build_router;
use lucid_journal::handlers::state::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting lucid-journal server");

    let config = ServerConfig::from_env();
    config.validate()?;
    config.log();

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_second)
        .burst_size(config.rate_limit_burst)
        .finish()
        .expect("invalid rate limiter configuration");
    let governor_layer = GovernorLayer::new(governor_conf);

    let cors = config.cors.to_layer();
    let max_concurrent = config.max_concurrent_requests;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let state = AppContext::new(config)?;
    let app = build_router(state)
        .layer(governor_layer)
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(cors);

    info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining requests");
}
