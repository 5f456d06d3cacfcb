//! Configuration type definitions.

use std::path::PathBuf;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;

/// Root configuration structure.
///
/// Keys keep the PascalCase names of the classic `config.ini`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Primary channel, joined at startup.
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_nick")]
    pub nick: String,
    /// Notice sent to everyone joining a logged channel.
    #[serde(default = "default_join_message")]
    pub join_message: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Directory holding the static files copied into every channel directory.
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,
    /// Shared secret suffix for control commands.
    #[serde(default)]
    pub control_password: Option<String>,
    #[serde(default = "default_pid_file")]
    pub pid_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            channel: default_channel(),
            nick: default_nick(),
            join_message: default_join_message(),
            output_dir: default_output_dir(),
            template_dir: default_template_dir(),
            control_password: None,
            pid_file: default_pid_file(),
        }
    }
}

impl Config {
    /// Return the control password, generating a random one if unset.
    ///
    /// A generated password is stored so later calls agree.
    pub fn ensure_control_password(&mut self) -> &str {
        self.control_password
            .get_or_insert_with(random_password)
            .as_str()
    }
}

/// Generate a 32 character alphanumeric secret.
fn random_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6667
}

fn default_channel() -> String {
    "#test".to_string()
}

fn default_nick() -> String {
    "LogBot".to_string()
}

fn default_join_message() -> String {
    "This channel is logged.".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output/")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("./html/")
}

fn default_pid_file() -> PathBuf {
    PathBuf::from("./logbot.pid")
}
