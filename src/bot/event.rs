//! Inbound events delivered to the bot by the transport.

use chrono::{DateTime, Local};

/// CTCP query kinds that are logged as probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Ping,
    Time,
    Version,
}

impl ProbeKind {
    /// Parse a CTCP command name (case-insensitive).
    pub fn from_ctcp(command: &str) -> Option<Self> {
        match command.to_ascii_uppercase().as_str() {
            "PING" => Some(Self::Ping),
            "TIME" => Some(Self::Time),
            "VERSION" => Some(Self::Version),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Time => "TIME",
            Self::Version => "VERSION",
        }
    }
}

/// A parsed IRC event. One variant per kind the bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcEvent {
    /// The transport finished registration with the server.
    Connected,
    /// The connection was lost.
    Disconnected,
    /// CTCP ACTION (`/me`) sent to a channel or to the bot.
    Action {
        sender: String,
        target: String,
        action: String,
    },
    Join {
        channel: String,
        sender: String,
    },
    /// Channel message.
    Message {
        channel: String,
        sender: String,
        message: String,
    },
    /// Channel mode change; `mode` holds the mode string and its arguments.
    Mode {
        channel: String,
        setter: String,
        mode: String,
    },
    NickChange {
        old_nick: String,
        new_nick: String,
    },
    Notice {
        sender: String,
        target: String,
        notice: String,
    },
    Part {
        channel: String,
        sender: String,
    },
    /// CTCP PING, TIME or VERSION query.
    Probe {
        sender: String,
        target: String,
        kind: ProbeKind,
    },
    /// Message sent directly to the bot.
    PrivateMessage {
        sender: String,
        message: String,
    },
    Quit {
        sender: String,
        reason: String,
    },
    /// Someone changed the topic.
    TopicChange {
        channel: String,
        setter: String,
        topic: String,
    },
    /// Topic reported by the server when the bot joins a channel.
    TopicSnapshot {
        channel: String,
        topic: String,
        setter: String,
        set_at: DateTime<Local>,
    },
    Kick {
        channel: String,
        kicker: String,
        victim: String,
        reason: String,
    },
}
