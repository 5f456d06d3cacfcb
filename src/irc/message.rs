//! Parsing of raw IRC protocol lines.

use crate::common::error::ProtocolError;

/// One protocol line split into prefix, command and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Origin without the leading `:` (`nick!user@host` or a server name).
    pub prefix: Option<String>,
    /// Command name or three-digit numeric, uppercased.
    pub command: String,
    /// Middle parameters followed by the trailing one, if any.
    pub params: Vec<String>,
}

impl Message {
    /// Parse a line without its CRLF. IRCv3 message tags are skipped.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut rest = line.trim_start();
        if rest.is_empty() {
            return Err(ProtocolError::EmptyLine);
        }

        if rest.starts_with('@') {
            rest = rest.split_once(' ').map_or("", |(_, r)| r).trim_start();
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (source, r) = stripped.split_once(' ').unwrap_or((stripped, ""));
            prefix = Some(source.to_string());
            rest = r.trim_start();
        }

        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(ProtocolError::MissingCommand {
                line: line.to_string(),
            });
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            let (param, r) = rest.split_once(' ').unwrap_or((rest, ""));
            params.push(param.to_string());
            rest = r;
        }

        Ok(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }

    /// Nick part of the prefix, or the whole prefix for server origins.
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|p| p.split_once('!').map_or(p, |(nick, _)| nick))
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}
