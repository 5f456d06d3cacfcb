//! Sanity checks on loaded settings.

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::env::apply_env_overrides;
use crate::config::parser::load_config;
use crate::config::types::Config;

/// Check every setting, reporting all problems at once.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.server.is_empty() {
        errors.push("Server is required".to_string());
    }
    if config.port == 0 {
        errors.push("Port must be non-zero".to_string());
    }

    if config.nick.is_empty() {
        errors.push("Nick is required".to_string());
    }
    if config.nick.chars().any(char::is_whitespace) {
        errors.push(format!("Nick '{}' must not contain whitespace", config.nick));
    }

    if config.channel.trim_start_matches('#').is_empty() {
        errors.push("Channel is required".to_string());
    }
    if config.channel.chars().any(|c| c.is_whitespace() || c == ',') {
        errors.push(format!(
            "Channel '{}' must not contain whitespace or commas",
            config.channel
        ));
    }

    // An empty suffix would authenticate every private message
    if let Some(ref password) = config.control_password {
        if password.trim().is_empty() {
            errors.push("ControlPassword must not be empty when set".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

/// Load a config file, apply environment overrides, and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let config = apply_env_overrides(load_config(path)?);
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_config() -> Config {
        Config {
            control_password: Some("s3cr3t".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&make_valid_config()).is_ok());
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_server_fails() {
        let mut config = make_valid_config();
        config.server = String::new();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("Server"));
    }

    #[test]
    fn test_nick_with_space_fails() {
        let mut config = make_valid_config();
        config.nick = "Log Bot".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("whitespace"));
    }

    #[test]
    fn test_bare_hash_channel_fails() {
        let mut config = make_valid_config();
        config.channel = "#".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("Channel is required"));
    }

    #[test]
    fn test_empty_password_fails() {
        let mut config = make_valid_config();
        config.control_password = Some("  ".to_string());

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("ControlPassword"));
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = make_valid_config();
        config.server = String::new();
        config.port = 0;

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("Server"));
        assert!(message.contains("Port"));
    }

    #[test]
    fn test_load_and_validate_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logbot.conf");
        std::fs::write(&path, "Nick = \"Scribe\"\nChannel = \"#rust\"\n").unwrap();

        let config = load_and_validate(&path).unwrap();
        assert_eq!(config.channel, "#rust");
    }
}
