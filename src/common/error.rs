//! Error types shared across the bot.

use thiserror::Error;

/// Errors that stop the bot at startup or end its session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config: {0}")]
    Config(#[from] ConfigError),

    #[error("Connection: {0}")]
    Connection(#[from] ConnectionError),
}

/// Problems reading or validating `logbot.conf`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid HOCON: {message}")]
    ParseError { message: String },

    #[error("Invalid settings:\n{message}")]
    ValidationError { message: String },
}

/// Errors raised while setting up a channel's output directory.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Cannot make output directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't copy template '{file}' into the output directory: {source}")]
    CopyTemplate {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't write generated config '{path}': {source}")]
    WriteConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Protocol-related errors (IRC line parsing).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Empty line")]
    EmptyLine,

    #[error("No command in line: {line}")]
    MissingCommand { line: String },
}

/// Failures of the IRC connection or its registration.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Cannot reach {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Server closed the connection")]
    ConnectionClosed,

    #[error("Nickname '{nick}' is already in use")]
    NickInUse { nick: String },

    #[error("Registration failed: {message}")]
    Registration { message: String },

    #[error("Server sent a line longer than {max} bytes")]
    LineTooLong { max: usize },

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gave up reconnecting")]
    MaxReconnectAttempts,
}

/// Result of startup and session operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result of connection operations.
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;
