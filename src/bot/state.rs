//! Per-channel logging state.
//!
//! Channel names are stored without their leading `#` and ASCII-lowercased.
//! Every public method normalizes its argument, so `#Rust`, `#rust` and
//! `rust` address the same entry.

use std::collections::{HashMap, HashSet};

/// Whether a tracked channel is currently being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// Events are written to the channel's log.
    Listening,
    /// The bot stays in the channel but drops its events.
    Ignoring,
}

/// Strip a single leading `#` and fold ASCII case; IRC channel names are
/// case-insensitive.
pub fn normalize_channel(channel: &str) -> String {
    channel
        .strip_prefix('#')
        .unwrap_or(channel)
        .to_ascii_lowercase()
}

/// Prefix a channel name with `#` unless it already has one.
pub fn with_hash(channel: &str) -> String {
    if channel.starts_with('#') {
        channel.to_string()
    } else {
        format!("#{}", channel)
    }
}

/// Mapping of tracked channel to its logging state.
#[derive(Debug, Default)]
pub struct ChannelStore {
    states: HashMap<String, ChannelState>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&mut self, channel: &str, state: ChannelState) {
        self.states
            .insert(normalize_channel(channel), state);
    }

    /// `None` means the channel is not currently joined.
    pub fn get_state(&self, channel: &str) -> Option<ChannelState> {
        self.states.get(&normalize_channel(channel)).copied()
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.states.contains_key(&normalize_channel(channel))
    }

    /// Stop tracking a channel. Returns the state it had, if any.
    pub fn remove(&mut self, channel: &str) -> Option<ChannelState> {
        self.states.remove(&normalize_channel(channel))
    }

    /// Every tracked channel whose state satisfies `predicate`.
    pub fn list_channels(&self, predicate: impl Fn(ChannelState) -> bool) -> HashSet<String> {
        self.states
            .iter()
            .filter(|(_, state)| predicate(**state))
            .map(|(channel, _)| channel.clone())
            .collect()
    }

    /// Every tracked channel, regardless of state.
    pub fn all_channels(&self) -> HashSet<String> {
        self.list_channels(|_| true)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
