//! LogBot - unattended IRC channel logger
//!
//! Records channel activity to per-channel, per-day HTML log fragments and
//! takes control commands over private message, authenticated by a shared
//! secret.

mod bot;
mod common;
mod config;
mod irc;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use bot::LogBot;
use common::error::AppError;
use common::pidfile::{remove_pid_file, write_pid_file};
use common::ReconnectPolicy;
use config::{env::get_config_path, load_and_validate, Config};
use irc::{run_session, SessionSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("LogBot v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_config(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Server: {}:{}", config.server, config.port);
    info!("  Nick: {}", config.nick);
    info!("  Channel: {}", config.channel);
    info!("  Output: {}", config.output_dir.display());

    if let Err(e) = write_pid_file(&config.pid_file) {
        warn!("Could not write PID file {}: {}", config.pid_file.display(), e);
    }

    let result = run(&config).await;

    if let Err(e) = remove_pid_file(&config.pid_file) {
        warn!("Could not remove PID file {}: {}", config.pid_file.display(), e);
    }

    info!("Exiting...");
    Ok(result?)
}

/// Load and validate the configuration, filling in a control password.
fn load_config(path: &str) -> common::error::Result<Config> {
    let mut config = load_and_validate(path)?;
    if config.control_password.is_none() {
        warn!("No ControlPassword configured; using a random one, so commands cannot be authenticated");
    }
    config.ensure_control_password();
    Ok(config)
}

/// Bootstrap the bot and keep it connected until a shutdown signal arrives.
async fn run(config: &Config) -> common::error::Result<()> {
    let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let bot = Arc::new(LogBot::from_config(config, outgoing_tx));
    // A primary channel that cannot be provisioned is logged and left untracked
    bot.bootstrap();

    let settings = SessionSettings {
        host: config.server.clone(),
        port: config.port,
        nick: bot.nick().to_string(),
        policy: ReconnectPolicy::default(),
    };
    let mut session = tokio::spawn(run_session(settings, bot, outgoing_rx, shutdown_rx));

    tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            if shutdown_tx.send(true).is_err() {
                warn!("Session already stopped");
            }
            let timeout = tokio::time::Duration::from_secs(5);
            match tokio::time::timeout(timeout, session).await {
                Ok(Ok(result)) => result.map_err(AppError::from),
                Ok(Err(e)) => {
                    warn!("Session task panicked: {}", e);
                    Ok(())
                }
                Err(_) => {
                    warn!("Disconnect timed out");
                    Ok(())
                }
            }
        }
        joined = &mut session => match joined {
            Ok(result) => result.map_err(AppError::from),
            Err(e) => {
                error!("Session task panicked: {}", e);
                Ok(())
            }
        },
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
