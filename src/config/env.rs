//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `LOGBOT_SERVER` - IRC server host
//! - `LOGBOT_PORT` - IRC server port
//! - `LOGBOT_CHANNEL` - Primary channel
//! - `LOGBOT_NICK` - Bot nickname
//! - `LOGBOT_OUTPUT_DIR` - Log output directory
//! - `LOGBOT_CONTROL_PASSWORD` - Shared secret for control commands

use std::env;
use std::path::PathBuf;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "LOGBOT";

/// Apply environment variable overrides to a config.
///
/// This allows the control password to be provided via the environment
/// instead of the config file.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |name| env::var(name).ok())
}

/// Apply overrides using an arbitrary variable lookup.
fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    let var = |suffix: &str| lookup(&format!("{}_{}", ENV_PREFIX, suffix));

    if let Some(server) = var("SERVER") {
        config.server = server;
    }
    if let Some(port) = var("PORT") {
        if let Ok(port) = port.parse() {
            config.port = port;
        }
    }
    if let Some(channel) = var("CHANNEL") {
        config.channel = channel;
    }
    if let Some(nick) = var("NICK") {
        config.nick = nick;
    }
    if let Some(dir) = var("OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    if let Some(password) = var("CONTROL_PASSWORD") {
        config.control_password = Some(password);
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `LOGBOT_CONFIG` environment variable, otherwise returns "logbot.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "logbot.conf".to_string())
}
