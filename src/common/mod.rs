//! Common utilities and types shared across the application.

pub mod error;
pub mod pidfile;
pub mod reconnect;

pub use reconnect::ReconnectPolicy;
