mod api;
mod bootstrap;
mod health;
mod intake;

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::Result;
use ozunlu_core::config::{AppConfig, LoadOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    use ozunlu_core::config::LogFormat::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let router = api::app(app.intake.clone(), &app.config.server.allowed_origin)?;

    let address = app.config.server_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        quote_id = "unknown",
        bind_address = %address,
        allowed_origin = %app.config.server.allowed_origin,
        "ozunlu-server listening"
    );

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .into_future(),
    );

    tokio::select! {
        joined = &mut server => {
            joined??;
            return Ok(());
        }
        signal = wait_for_shutdown() => signal?,
    }

    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        quote_id = "unknown",
        "ozunlu-server draining connections"
    );
    let _ = stop_tx.send(());

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => joined??,
        Err(_) => {
            warn!(
                event_name = "system.server.drain_timeout",
                correlation_id = "shutdown",
                quote_id = "unknown",
                grace_secs = grace.as_secs(),
                "connections still open after the grace period"
            );
            server.abort();
        }
    }

    if let Some(pool) = app.db_pool {
        pool.close().await;
    }
    info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        quote_id = "unknown",
        "ozunlu-server stopped"
    );
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
