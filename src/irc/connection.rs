//! Server connection and client registration.

use chrono::Local;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::common::error::{ConnectionError, ConnectionResult};
use crate::irc::codec::{new_irc_connection, IrcConnection};
use crate::irc::events::parse_ctcp;
use crate::irc::message::Message;

const RPL_WELCOME: &str = "001";
const ERR_NICKNAMEINUSE: &str = "433";
const ERR_ERRONEUSNICKNAME: &str = "432";

/// Reply to CTCP VERSION queries.
pub const VERSION_REPLY: &str = concat!("LogBot ", env!("CARGO_PKG_VERSION"));

/// Connect to `host:port` and register as `nick`.
pub async fn connect_and_register(
    host: &str,
    port: u16,
    nick: &str,
) -> ConnectionResult<IrcConnection<TcpStream>> {
    info!("Connecting to IRC server at {}:{}", host, port);
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| ConnectionError::ConnectFailed {
            host: host.to_string(),
            port,
            source: e,
        })?;

    let mut connection = new_irc_connection(stream);
    register(&mut connection, nick).await?;
    Ok(connection)
}

/// Send NICK/USER and wait for the welcome numeric, answering PINGs.
pub async fn register<S>(connection: &mut IrcConnection<S>, nick: &str) -> ConnectionResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    connection.send(format!("NICK {}", nick)).await?;
    connection.send(format!("USER {} 0 * :{}", nick, nick)).await?;

    while let Some(line) = connection.next().await {
        let line = line?;
        let msg = match Message::parse(&line) {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Skipping line during registration: {}", e);
                continue;
            }
        };

        match msg.command.as_str() {
            RPL_WELCOME => {
                info!("Registered as {}", nick);
                return Ok(());
            }
            ERR_NICKNAMEINUSE => {
                return Err(ConnectionError::NickInUse {
                    nick: nick.to_string(),
                })
            }
            ERR_ERRONEUSNICKNAME => {
                return Err(ConnectionError::Registration {
                    message: format!("server rejected nick '{}'", nick),
                })
            }
            "ERROR" => {
                return Err(ConnectionError::Registration {
                    message: msg.param(0).unwrap_or_default().to_string(),
                })
            }
            _ => {
                if let Some(reply) = auto_reply(&msg) {
                    connection.send(reply).await?;
                }
            }
        }
    }

    warn!("Connection closed during registration");
    Err(ConnectionError::ConnectionClosed)
}

/// Protocol-level reply the client owes the server or a peer: PONG for
/// server PINGs, and answers to CTCP VERSION, PING and TIME queries.
pub fn auto_reply(msg: &Message) -> Option<String> {
    match msg.command.as_str() {
        "PING" => Some(format!("PONG :{}", msg.param(0).unwrap_or_default())),
        "PRIVMSG" => {
            let sender = msg.source_nick()?;
            let (command, args) = parse_ctcp(msg.param(1)?)?;
            let payload = match command.to_ascii_uppercase().as_str() {
                "VERSION" => format!("VERSION {}", VERSION_REPLY),
                "PING" => format!("PING {}", args),
                "TIME" => format!("TIME {}", Local::now().to_rfc2822()),
                _ => return None,
            };
            Some(format!("NOTICE {} :\x01{}\x01", sender, payload))
        }
        _ => None,
    }
}
