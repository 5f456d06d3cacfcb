//! Long-running connection driver: connects, reconnects and shuttles lines
//! between the server and the bot.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::bot::{IrcEvent, LogBot};
use crate::common::error::ConnectionResult;
use crate::common::reconnect::{retry_connect, ReconnectPolicy};
use crate::irc::codec::IrcConnection;
use crate::irc::connection::{auto_reply, connect_and_register};
use crate::irc::events::EventTranslator;
use crate::irc::message::Message;
use crate::irc::outgoing::Outgoing;

const QUIT_MESSAGE: &str = "QUIT :LogBot shutting down";

/// How a connected session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server closed the connection.
    Disconnected,
    /// Shutdown was requested and QUIT was sent.
    Shutdown,
}

/// Where and as whom to connect.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub host: String,
    pub port: u16,
    pub nick: String,
    pub policy: ReconnectPolicy,
}

/// Keep the bot connected until shutdown is signalled.
///
/// Each successful registration is reported to the bot as `Connected` and
/// each lost connection as `Disconnected`.
pub async fn run_session(
    settings: SessionSettings,
    bot: Arc<LogBot>,
    mut outgoing_rx: mpsc::UnboundedReceiver<Outgoing>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> ConnectionResult<()> {
    loop {
        let connect = retry_connect(
            &settings.policy,
            || connect_and_register(&settings.host, settings.port, &settings.nick),
            tokio::time::sleep,
        );

        let mut connection = tokio::select! {
            result = connect => result?,
            _ = wait_for_shutdown(&mut shutdown_rx) => {
                info!("Shutdown requested while connecting");
                return Ok(());
            }
        };

        bot.handle_event(IrcEvent::Connected);

        let end = drive(&mut connection, &bot, &mut outgoing_rx, &mut shutdown_rx).await;
        match end {
            Ok(SessionEnd::Shutdown) => return Ok(()),
            Ok(SessionEnd::Disconnected) => warn!("Disconnected from server"),
            Err(e) => error!("Connection error: {}", e),
        }

        bot.handle_event(IrcEvent::Disconnected);
    }
}

/// Pump one registered connection until it closes or shutdown is requested.
pub async fn drive<S>(
    connection: &mut IrcConnection<S>,
    bot: &LogBot,
    outgoing_rx: &mut mpsc::UnboundedReceiver<Outgoing>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> ConnectionResult<SessionEnd>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut translator = EventTranslator::new();

    loop {
        tokio::select! {
            line = connection.next() => {
                match line {
                    Some(Ok(line)) => handle_line(connection, bot, &mut translator, &line).await?,
                    Some(Err(e)) => return Err(e),
                    None => return Ok(SessionEnd::Disconnected),
                }
            }

            Some(outgoing) = outgoing_rx.recv() => {
                connection.send(outgoing.to_line()).await?;
            }

            _ = wait_for_shutdown(shutdown_rx) => {
                info!("Shutdown requested, leaving server");
                if let Err(e) = connection.send(QUIT_MESSAGE.to_string()).await {
                    warn!("Failed to send QUIT: {}", e);
                }
                return Ok(SessionEnd::Shutdown);
            }
        }
    }
}

async fn handle_line<S>(
    connection: &mut IrcConnection<S>,
    bot: &LogBot,
    translator: &mut EventTranslator,
    line: &str,
) -> ConnectionResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let msg = match Message::parse(line) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("Skipping unparseable line: {}", e);
            return Ok(());
        }
    };

    if msg.command == "ERROR" {
        warn!("Server error: {}", msg.param(0).unwrap_or_default());
    }
    if let Some(reply) = auto_reply(&msg) {
        connection.send(reply).await?;
    }
    if let Some(event) = translator.translate(&msg) {
        bot.handle_event(event);
    }
    Ok(())
}

/// Resolves once shutdown is signalled or the sender is gone.
async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    while !*shutdown_rx.borrow_and_update() {
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}
