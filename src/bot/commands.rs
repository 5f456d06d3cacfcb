//! Private-message control commands.
//!
//! A private message ending with the shared secret is an authenticated
//! command of the form `{verb} {channel}`. Anything else is either the
//! plain `help` request or ignored.

use crate::bot::state::with_hash;

/// Help text sent for `help` and for malformed commands.
pub const HELP_LINES: &[&str] = &[
    "I understand the following commands:",
    "  'help'             - prints this message",
    "  'join [channel]'   - join the specified channel and start logging",
    "  'leave [channel]'  - leave the specified channel and stop logging",
    "  'ignore [channel]' - stop logging, but don't leave, the specified channel",
    "  'listen [channel]' - start logging the specified channel again",
];

/// A validated control command. Channels always carry a leading `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Join(String),
    Leave(String),
    Ignore(String),
    Listen(String),
    /// Unrecognized or underspecified; answered with the help text.
    Help,
}

impl ControlCommand {
    /// Parse the authenticated part of a private message.
    pub fn parse(command: &str) -> Self {
        let mut parts = command.split_whitespace();
        let (Some(verb), Some(channel)) = (parts.next(), parts.next()) else {
            return Self::Help;
        };
        let channel = with_hash(channel);

        match verb.to_lowercase().as_str() {
            "join" => Self::Join(channel),
            "leave" => Self::Leave(channel),
            "ignore" => Self::Ignore(channel),
            "listen" => Self::Listen(channel),
            _ => Self::Help,
        }
    }
}

/// How a private message was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateRequest {
    /// Ended with the secret. Holds the message with the secret removed.
    Authenticated(String),
    /// The bare word `help`.
    Help,
    /// Anything else, logged only.
    Unauthenticated,
}

/// Classify a private message against the shared secret.
pub fn classify_private(message: &str, secret: &str) -> PrivateRequest {
    if !secret.is_empty() {
        if let Some(command) = message.strip_suffix(secret) {
            return PrivateRequest::Authenticated(command.trim_end().to_string());
        }
    }
    if message.to_lowercase() == "help" {
        PrivateRequest::Help
    } else {
        PrivateRequest::Unauthenticated
    }
}
