//! Channel output directories.
//!
//! Each channel gets `{output_dir}/{channel-without-hash}/` holding the static
//! display templates, a generated `config.inc.php`, and one log file per day.

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::bot::state::normalize_channel;
use crate::common::error::ProvisionError;

/// Static files copied from the template directory into every channel directory.
pub const TEMPLATE_FILES: &[&str] = &["header.inc.php", "footer.inc.php", "index.php"];

/// Name of the generated display configuration file.
pub const GENERATED_CONFIG: &str = "config.inc.php";

/// Maps channels to their provisioned output directories.
#[derive(Debug)]
pub struct ChannelDirectories {
    base_dir: PathBuf,
    template_dir: PathBuf,
    server: String,
    nick: String,
    directories: HashMap<String, PathBuf>,
}

impl ChannelDirectories {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
        server: impl Into<String>,
        nick: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            template_dir: template_dir.into(),
            server: server.into(),
            nick: nick.into(),
            directories: HashMap::new(),
        }
    }

    /// Create the channel's directory, copy the templates and write the
    /// generated config. Safe to call again for an existing directory.
    pub fn provision(&mut self, channel: &str) -> Result<PathBuf, ProvisionError> {
        let name = normalize_channel(channel);
        let out_dir = self.base_dir.join(&name);

        fs::create_dir_all(&out_dir).map_err(|source| ProvisionError::CreateDir {
            path: out_dir.display().to_string(),
            source,
        })?;

        for file in TEMPLATE_FILES {
            fs::copy(self.template_dir.join(file), out_dir.join(file)).map_err(|source| {
                ProvisionError::CopyTemplate {
                    file: file.to_string(),
                    source,
                }
            })?;
        }

        let config_path = out_dir.join(GENERATED_CONFIG);
        self.write_generated_config(&config_path, channel)
            .map_err(|source| ProvisionError::WriteConfig {
                path: config_path.display().to_string(),
                source,
            })?;

        debug!("Provisioned output directory {}", out_dir.display());
        self.directories.insert(name, out_dir.clone());
        Ok(out_dir)
    }

    /// Like [`provision`](Self::provision) but logs the failure and returns
    /// whether the directory is usable.
    pub fn try_provision(&mut self, channel: &str) -> bool {
        match self.provision(channel) {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to set up output for {}: {}", channel, e);
                false
            }
        }
    }

    /// The provisioned directory of a channel, if any.
    pub fn directory(&self, channel: &str) -> Option<&Path> {
        self.directories
            .get(&normalize_channel(channel))
            .map(PathBuf::as_path)
    }

    /// Path of the channel's log file for `date`.
    ///
    /// Uses the provisioned directory when known, otherwise the directory
    /// the channel would be provisioned into.
    pub fn resolve_log_file(&self, channel: &str, date: NaiveDate) -> PathBuf {
        let dir = self
            .directory(channel)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_dir.join(normalize_channel(channel)));
        dir.join(log_file_name(date))
    }

    fn write_generated_config(&self, path: &Path, channel: &str) -> std::io::Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        writeln!(writer, "<?php")?;
        writeln!(writer, "    $server = \"{}\";", php_escape(&self.server))?;
        writeln!(writer, "    $channel = \"{}\";", php_escape(channel))?;
        writeln!(writer, "    $nick = \"{}\";", php_escape(&self.nick))?;
        write!(writer, "?>")?;
        writer.flush()
    }
}

/// `YYYY-MM-DD.log`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}.log", date.format("%Y-%m-%d"))
}

/// Escape a value for a double-quoted PHP string.
fn php_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
}
