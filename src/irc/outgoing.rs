//! Outbound requests from the bot to the transport.

/// A request for the transport to send something to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Join(String),
    Part(String),
    Message { target: String, text: String },
    Notice { target: String, text: String },
    /// CTCP ACTION (`/me`).
    Action { target: String, text: String },
}

impl Outgoing {
    pub fn message(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Message {
            target: target.into(),
            text: text.into(),
        }
    }

    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Notice {
            target: target.into(),
            text: text.into(),
        }
    }

    pub fn action(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Action {
            target: target.into(),
            text: text.into(),
        }
    }

    /// Render as a protocol line (without CRLF).
    pub fn to_line(&self) -> String {
        match self {
            Self::Join(channel) => format!("JOIN {}", sanitize(channel)),
            Self::Part(channel) => format!("PART {}", sanitize(channel)),
            Self::Message { target, text } => {
                format!("PRIVMSG {} :{}", sanitize(target), sanitize(text))
            }
            Self::Notice { target, text } => {
                format!("NOTICE {} :{}", sanitize(target), sanitize(text))
            }
            Self::Action { target, text } => {
                format!("PRIVMSG {} :\x01ACTION {}\x01", sanitize(target), sanitize(text))
            }
        }
    }
}

/// Drop characters that would end or corrupt a protocol line.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\0'))
        .collect()
}
