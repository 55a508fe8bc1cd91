mod config;
mod platform;
mod update;
mod webhook;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, BOT_TOKEN_ENV};
use crate::platform::telegram::TelegramNotifier;
use crate::webhook::WebhookState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vercel_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("  Bind address: {}", config.server.bind_address);
    info!("  Telegram API: {}", config.telegram.api_base_url);
    if config.bot_token().is_none() {
        // Keep serving so the webhook answers with a clear error.
        warn!("{} not set; updates will be rejected", BOT_TOKEN_ENV);
    }

    let notifier = Arc::new(TelegramNotifier::new(config.telegram.api_base_url.clone()));
    let state = WebhookState::new(config.bot_token(), notifier, config.server.max_body_bytes);
    let app = webhook::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind_address))?;

    info!("Webhook listening on http://{}/api/webhook", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await
        .context("Server error")?;

    Ok(())
}

/// Resolves when `signal` fires. If the handler cannot be installed the
/// server keeps running instead of shutting down straight away.
async fn shutdown_signal(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        warn!("Failed to listen for Ctrl-C, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_on_signal() {
        let done = tokio::time::timeout(
            Duration::from_millis(200),
            shutdown_signal(async { Ok(()) }),
        )
        .await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn test_failed_signal_handler_keeps_serving() {
        let done = tokio::time::timeout(
            Duration::from_millis(200),
            shutdown_signal(async { Err(std::io::Error::other("no signal driver")) }),
        )
        .await;
        assert!(done.is_err());
    }
}
