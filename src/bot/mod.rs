//! Channel logging core.

pub mod commands;
pub mod directory;
pub mod event;
pub mod format;
pub mod logbot;
pub mod router;
pub mod state;

pub use directory::ChannelDirectories;
pub use event::IrcEvent;
pub use logbot::{BotSettings, LogBot};
