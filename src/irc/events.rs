//! Translation of protocol messages into bot events.

use std::collections::HashMap;

use chrono::{Local, TimeZone};
use tracing::debug;

use crate::bot::event::{IrcEvent, ProbeKind};
use crate::irc::message::Message;

const RPL_TOPIC: &str = "332";
const RPL_TOPICWHOTIME: &str = "333";

/// Whether `target` names a channel rather than a user.
pub fn is_channel_name(target: &str) -> bool {
    target.starts_with(['#', '&', '+', '!'])
}

/// Split a CTCP payload (`\x01COMMAND args\x01`) into command and arguments.
pub fn parse_ctcp(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix('\x01')?;
    let inner = inner.strip_suffix('\x01').unwrap_or(inner);
    Some(inner.split_once(' ').unwrap_or((inner, "")))
}

/// Stateful translator. The topic text (332) and its setter (333) arrive
/// as separate numerics and are joined into one snapshot here.
#[derive(Debug, Default)]
pub struct EventTranslator {
    pending_topics: HashMap<String, String>,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event for `msg`, if it is one the bot reacts to.
    pub fn translate(&mut self, msg: &Message) -> Option<IrcEvent> {
        let sender = || msg.source_nick().unwrap_or_default().to_string();
        let param = |i: usize| msg.param(i).unwrap_or_default().to_string();

        match msg.command.as_str() {
            "PRIVMSG" => self.translate_privmsg(sender(), msg.param(0)?, msg.param(1)?),
            "NOTICE" => Some(IrcEvent::Notice {
                sender: sender(),
                target: msg.param(0)?.to_string(),
                notice: param(1),
            }),
            "JOIN" => Some(IrcEvent::Join {
                channel: msg.param(0)?.to_string(),
                sender: sender(),
            }),
            "PART" => Some(IrcEvent::Part {
                channel: msg.param(0)?.to_string(),
                sender: sender(),
            }),
            "MODE" => {
                let channel = msg.param(0)?;
                if !is_channel_name(channel) {
                    return None;
                }
                Some(IrcEvent::Mode {
                    channel: channel.to_string(),
                    setter: sender(),
                    mode: msg.params[1..].join(" "),
                })
            }
            "NICK" => Some(IrcEvent::NickChange {
                old_nick: sender(),
                new_nick: msg.param(0)?.to_string(),
            }),
            "QUIT" => Some(IrcEvent::Quit {
                sender: sender(),
                reason: param(0),
            }),
            "TOPIC" => Some(IrcEvent::TopicChange {
                channel: msg.param(0)?.to_string(),
                setter: sender(),
                topic: param(1),
            }),
            "KICK" => Some(IrcEvent::Kick {
                channel: msg.param(0)?.to_string(),
                kicker: sender(),
                victim: msg.param(1)?.to_string(),
                reason: param(2),
            }),
            RPL_TOPIC => {
                self.pending_topics
                    .insert(msg.param(1)?.to_string(), param(2));
                None
            }
            RPL_TOPICWHOTIME => self.translate_topic_who_time(msg),
            _ => None,
        }
    }

    fn translate_privmsg(&self, sender: String, target: &str, text: &str) -> Option<IrcEvent> {
        if let Some((command, args)) = parse_ctcp(text) {
            if command.eq_ignore_ascii_case("ACTION") {
                return Some(IrcEvent::Action {
                    sender,
                    target: target.to_string(),
                    action: args.to_string(),
                });
            }
            return match ProbeKind::from_ctcp(command) {
                Some(kind) => Some(IrcEvent::Probe {
                    sender,
                    target: target.to_string(),
                    kind,
                }),
                None => {
                    debug!("Ignoring CTCP {} from {}", command, sender);
                    None
                }
            };
        }

        if is_channel_name(target) {
            Some(IrcEvent::Message {
                channel: target.to_string(),
                sender,
                message: text.to_string(),
            })
        } else {
            Some(IrcEvent::PrivateMessage {
                sender,
                message: text.to_string(),
            })
        }
    }

    fn translate_topic_who_time(&mut self, msg: &Message) -> Option<IrcEvent> {
        let channel = msg.param(1)?;
        let Some(topic) = self.pending_topics.remove(channel) else {
            debug!("Topic details for {} without a topic", channel);
            return None;
        };
        let setter = msg.param(2)?;
        let setter = setter.split_once('!').map_or(setter, |(nick, _)| nick);
        let seconds: i64 = msg.param(3)?.parse().ok()?;
        let set_at = Local.timestamp_opt(seconds, 0).single()?;

        Some(IrcEvent::TopicSnapshot {
            channel: channel.to_string(),
            topic,
            setter: setter.to_string(),
            set_at,
        })
    }
}
