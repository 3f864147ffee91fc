//! mcrelay - Minecraft chat relay
//!
//! A clientless bot that joins a Minecraft server, normalizes the chat it
//! sees and republishes it to a Redis pub/sub channel keyed by the server.

mod chat;
mod common;
mod config;
mod game;
mod protocol;
mod relay;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use chat::{ChatPipeline, LocalizationCatalog, MessageNormalizer, NoiseFilter};
use config::{env::get_config_path, load_and_validate};
use game::{SessionContext, SessionManager, SessionSettings};
use protocol::TcpConnector;
use relay::{RedisPublisher, Relay};

#[derive(Debug, Parser)]
#[command(version, about = "Relay Minecraft server chat to Redis pub/sub")]
struct Args {
    /// Server entry under `minecraft` in the config file
    server: String,

    /// Config file path (default: $MCRELAY_CONFIG or mcrelay.conf)
    #[arg(long)]
    config: Option<String>,

    /// Localization file path, overriding `lang_file`
    #[arg(long)]
    lang: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("mcrelay v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = args.config.clone().unwrap_or_else(get_config_path);
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    let server = config.server(&args.server).map_err(|e| {
        error!("{}", e);
        e
    })?;
    let identity = server.identity();
    let credentials = config.credentials();

    info!("Configuration loaded successfully");
    info!("  Server: {} ({})", args.server, identity);
    info!("  User: {}", credentials.username);
    info!("  Channel: {}", identity.channel_name());
    info!("  Redis: {}:{}", config.redis.host, config.redis.port);

    // Localization must be available before any chat arrives
    let lang_file = args.lang.as_deref().unwrap_or(config.lang_file());
    let catalog = LocalizationCatalog::load(lang_file).map_err(|e| {
        error!("{}", e);
        e
    })?;

    let pipeline = ChatPipeline::new(
        MessageNormalizer::new(Arc::new(catalog)),
        NoiseFilter::from_config(config.filters.as_ref()),
        server.color_mode(),
    );

    let (publisher, publisher_task) =
        RedisPublisher::spawn(config.redis.host.clone(), config.redis.port)?;

    let context = SessionContext {
        settings: Arc::new(SessionSettings {
            greeting: server.greeting(),
            keep_alive: server.keep_alive_enabled(),
            ..SessionSettings::default()
        }),
        pipeline: Arc::new(pipeline),
        relay: Relay::new(identity.channel_name(), Arc::new(publisher)),
    };

    let manager = SessionManager::new(TcpConnector, identity, credentials, context)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut session_task = tokio::spawn(async move {
        manager.run(shutdown_rx).await;
    });

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - closing session...");
            true
        }
        _ = &mut session_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (session loop already exited): {}", e);
        }
        let timeout = tokio::time::Duration::from_secs(5);
        match tokio::time::timeout(timeout, session_task).await {
            Ok(Ok(())) => info!("Session closed"),
            Ok(Err(e)) => warn!("Session task panicked: {}", e),
            Err(_) => warn!("Session shutdown timed out"),
        }
    }

    // The manager held the last relay handle; let queued messages flush.
    if tokio::time::timeout(tokio::time::Duration::from_secs(2), publisher_task)
        .await
        .is_err()
    {
        warn!("Redis writer did not finish in time");
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
