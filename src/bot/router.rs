//! Routing of formatted lines to channel log files.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::{debug, error};

use crate::bot::directory::ChannelDirectories;
use crate::bot::format::{format_time, render_entry, ColorTag, LineFormatter};
use crate::bot::state::{normalize_channel, ChannelState, ChannelStore};

/// The set of channels a line is written to.
///
/// Resolved against the store at dispatch time, so it reflects the current
/// state rather than the state when the event originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingTarget {
    /// One channel (or the bot's own nick); dropped if that channel is ignored.
    Channel(String),
    /// Every tracked channel, whatever its state.
    AllChannels,
    AllListening,
    AllIgnoring,
}

impl RoutingTarget {
    pub fn channel(name: impl Into<String>) -> Self {
        Self::Channel(name.into())
    }

    /// Normalized channel names to write to. Empty when the line must be dropped.
    pub fn resolve(&self, store: &ChannelStore) -> HashSet<String> {
        match self {
            Self::Channel(name) => {
                if store.get_state(name) == Some(ChannelState::Ignoring) {
                    return HashSet::new();
                }
                HashSet::from([normalize_channel(name)])
            }
            Self::AllChannels => store.all_channels(),
            Self::AllListening => store.list_channels(|s| s == ChannelState::Listening),
            Self::AllIgnoring => store.list_channels(|s| s == ChannelState::Ignoring),
        }
    }
}

/// Formats lines and appends them to the resolved channels' daily logs.
#[derive(Debug, Clone, Default)]
pub struct Router {
    formatter: LineFormatter,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format `line` and append it to every channel `target` resolves to.
    ///
    /// Returns the number of log files written. Write failures are logged
    /// and do not stop delivery to the remaining channels.
    pub fn append(
        &self,
        store: &ChannelStore,
        directories: &ChannelDirectories,
        color: ColorTag,
        line: &str,
        target: &RoutingTarget,
    ) -> usize {
        self.append_at(store, directories, color, line, target, Local::now())
    }

    /// [`append`](Self::append) with an explicit clock reading.
    pub fn append_at(
        &self,
        store: &ChannelStore,
        directories: &ChannelDirectories,
        color: ColorTag,
        line: &str,
        target: &RoutingTarget,
        now: DateTime<Local>,
    ) -> usize {
        let channels = target.resolve(store);
        if channels.is_empty() {
            return 0;
        }

        let entry = render_entry(&format_time(&now), color, &self.formatter.format(line));
        let date = now.date_naive();
        let mut written = 0;

        for channel in &channels {
            if directories.directory(channel).is_none() {
                debug!("No log directory for '{}', dropping line", channel);
                continue;
            }
            let path = directories.resolve_log_file(channel, date);
            match append_line(&path, &entry) {
                Ok(()) => written += 1,
                Err(e) => error!("Could not write to log {}: {}", path.display(), e),
            }
        }

        written
    }
}

/// Open (or create) `path`, append `entry` plus a newline, and sync it.
fn append_line(path: &Path, entry: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(entry.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    file.sync_data()
}
