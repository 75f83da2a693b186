//! Daily Check-in server
//!
//! Serves the check-in JSON API and sweeps idle sessions in the background.

use std::sync::Arc;

use daily_checkin::adapters::http::{build_router, CheckinHandlers};
use daily_checkin::application::ConversationEngine;
use daily_checkin::bootstrap::{build_services, reload_catalog};
use daily_checkin::config::{AppConfig, ConversationConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let services = build_services(&config).await?;
    let _sweeper = services.engine.spawn_eviction(
        config.conversation.sweep_interval(),
        config.conversation.session_ttl(),
    );

    #[cfg(unix)]
    let _reloader = spawn_catalog_reload(services.engine.clone(), config.conversation.clone())?;

    let handlers = CheckinHandlers::new(services.engine.clone(), services.gateway.clone());
    let app = build_router(handlers, &config.server);

    let addr = config.server.listen_addr()?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        remote = if services.gateway.is_degraded() { "degraded" } else { "connected" },
        "Daily check-in server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable output otherwise.
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.log_level.as_str().into());

    let (json, pretty) = if config.is_production() {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            ),
            None,
        )
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

/// Reloads the question catalog on SIGHUP.
#[cfg(unix)]
fn spawn_catalog_reload(
    engine: Arc<ConversationEngine>,
    config: ConversationConfig,
) -> std::io::Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = signal(SignalKind::hangup())?;
    Ok(tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            if let Err(err) = reload_catalog(&engine, &config).await {
                tracing::warn!(error = %err, "Question catalog reload failed; keeping current questions");
            }
        }
    }))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
