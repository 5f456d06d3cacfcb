//! The logging bot: routes inbound events to channel logs and executes
//! authenticated control commands.
//!
//! Channel state and directories sit behind a single mutex. Each event is
//! handled with the lock held from routing until the last log write is
//! synced, so concurrent callers never interleave writes or race on state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bot::commands::{classify_private, ControlCommand, PrivateRequest, HELP_LINES};
use crate::bot::directory::ChannelDirectories;
use crate::bot::event::IrcEvent;
use crate::bot::format::ColorTag;
use crate::bot::router::{Router, RoutingTarget};
use crate::bot::state::{with_hash, ChannelState, ChannelStore};
use crate::config::Config;
use crate::irc::Outgoing;

/// Identity and messages of the bot.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub nick: String,
    /// Channel joined at startup; also receives nick changes.
    pub primary_channel: String,
    pub join_message: String,
    /// Suffix that authenticates a private message as a command.
    pub control_password: String,
}

impl BotSettings {
    /// Settings from a loaded config. An unset control password disables
    /// every command, so callers should run
    /// [`Config::ensure_control_password`] first.
    pub fn from_config(config: &Config) -> Self {
        Self {
            nick: config.nick.clone(),
            primary_channel: with_hash(&config.channel),
            join_message: config.join_message.clone(),
            control_password: config.control_password.clone().unwrap_or_default(),
        }
    }
}

/// Mutable channel bookkeeping guarded by the bot's lock.
#[derive(Debug)]
struct Channels {
    store: ChannelStore,
    directories: ChannelDirectories,
}

pub struct LogBot {
    settings: BotSettings,
    router: Router,
    channels: Mutex<Channels>,
    outgoing_tx: mpsc::UnboundedSender<Outgoing>,
}

impl LogBot {
    pub fn new(
        settings: BotSettings,
        directories: ChannelDirectories,
        outgoing_tx: mpsc::UnboundedSender<Outgoing>,
    ) -> Self {
        Self {
            settings,
            router: Router::new(),
            channels: Mutex::new(Channels {
                store: ChannelStore::new(),
                directories,
            }),
            outgoing_tx,
        }
    }

    /// Build a bot from configuration.
    pub fn from_config(config: &Config, outgoing_tx: mpsc::UnboundedSender<Outgoing>) -> Self {
        let directories = ChannelDirectories::new(
            &config.output_dir,
            &config.template_dir,
            &config.server,
            &config.nick,
        );
        Self::new(BotSettings::from_config(config), directories, outgoing_tx)
    }

    pub fn nick(&self) -> &str {
        &self.settings.nick
    }

    /// Current state of a channel; `None` if it is not tracked.
    pub fn state(&self, channel: &str) -> Option<ChannelState> {
        self.lock().store.get_state(channel)
    }

    /// Provision the private-message sink and the primary channel, and mark
    /// the primary channel as listening. The transport joins it once connected.
    ///
    /// Returns false if the primary channel could not be provisioned. It is
    /// then left untracked; the bot keeps running and accepts `join`.
    pub fn bootstrap(&self) -> bool {
        let mut channels = self.lock();

        if let Err(e) = channels.directories.provision(&self.settings.nick) {
            warn!("Private messages will not be logged: {}", e);
        }

        let primary = &self.settings.primary_channel;
        if !channels.directories.try_provision(primary) {
            warn!("Not logging {}; send a join command once its output directory is usable", primary);
            return false;
        }
        channels.store.set_state(primary, ChannelState::Listening);
        info!("Logging {}", primary);
        true
    }

    /// Handle one inbound event.
    pub fn handle_event(&self, event: IrcEvent) {
        let mut channels = self.lock();
        let nick = self.settings.nick.as_str();

        match event {
            IrcEvent::Connected => {
                if channels.store.is_empty() {
                    info!("Connected; no channels to join");
                } else {
                    info!("Connected; joining {} tracked channels", channels.store.len());
                }
                for channel in channels.store.all_channels() {
                    self.send(Outgoing::Join(with_hash(&channel)));
                }
            }
            IrcEvent::Disconnected => {
                self.log(&channels, ColorTag::Navy, "* Disconnected.", RoutingTarget::AllChannels);
            }
            IrcEvent::Action {
                sender,
                target,
                action,
            } => {
                let line = format!("* {} {}", sender, action);
                self.log(&channels, ColorTag::Brick, &line, RoutingTarget::Channel(target));
            }
            IrcEvent::Join { channel, sender } => {
                let line = format!("* {} has joined {}", sender, channel);
                self.log(&channels, ColorTag::Green, &line, RoutingTarget::channel(&channel));

                let welcome_target = if sender.eq_ignore_ascii_case(nick) {
                    channel
                } else {
                    sender
                };
                self.send(Outgoing::notice(welcome_target, &self.settings.join_message));
            }
            IrcEvent::Message {
                channel,
                sender,
                message,
            } => {
                let line = format!("<{}> {}", sender, message);
                self.log(&channels, ColorTag::Black, &line, RoutingTarget::channel(&channel));

                if self.is_help_request(&message) {
                    self.send(Outgoing::message(channel, &self.settings.join_message));
                }
            }
            IrcEvent::Mode {
                channel,
                setter,
                mode,
            } => {
                let line = format!("* {} sets mode {}", setter, mode);
                self.log(&channels, ColorTag::Green, &line, RoutingTarget::Channel(channel));
            }
            IrcEvent::NickChange { old_nick, new_nick } => {
                // No per-user membership tracking: nick changes go to the primary channel
                let line = format!("* {} is now known as {}", old_nick, new_nick);
                let target = RoutingTarget::channel(&self.settings.primary_channel);
                self.log(&channels, ColorTag::Green, &line, target);
            }
            IrcEvent::Notice {
                sender,
                target,
                notice,
            } => {
                let line = format!("-{}- {}", sender, notice);
                self.log(&channels, ColorTag::Brown, &line, RoutingTarget::Channel(target));
            }
            IrcEvent::Part { channel, sender } => {
                let line = format!("* {} has left {}", sender, channel);
                self.log(&channels, ColorTag::Green, &line, RoutingTarget::Channel(channel));
            }
            IrcEvent::Probe {
                sender,
                target,
                kind,
            } => {
                let line = format!("[{} {}]", sender, kind.name());
                self.log(&channels, ColorTag::Red, &line, RoutingTarget::Channel(target));
            }
            IrcEvent::PrivateMessage { sender, message } => {
                self.handle_private_message(&mut channels, &sender, &message);
            }
            IrcEvent::Quit { sender, reason } => {
                // Membership is unknown, so every tracked channel gets the line
                let line = format!("* {} Quit ({})", sender, reason);
                self.log(&channels, ColorTag::Navy, &line, RoutingTarget::AllChannels);
            }
            IrcEvent::TopicChange {
                channel,
                setter,
                topic,
            } => {
                let line = format!("* {} changes topic to '{}'", setter, topic);
                self.log(&channels, ColorTag::Green, &line, RoutingTarget::Channel(channel));
            }
            IrcEvent::TopicSnapshot {
                channel,
                topic,
                setter,
                set_at,
            } => {
                let target = RoutingTarget::Channel(channel);
                let topic_line = format!("* Topic is '{}'", topic);
                self.log(&channels, ColorTag::Green, &topic_line, target.clone());
                let setter_line = format!(
                    "* Set by {} on {}",
                    setter,
                    set_at.format("%Y-%m-%d %H:%M:%S")
                );
                self.log(&channels, ColorTag::Green, &setter_line, target);
            }
            IrcEvent::Kick {
                channel,
                kicker,
                victim,
                reason,
            } => {
                let line = format!("* {} was kicked from {} by {}", victim, channel, kicker);
                self.log(&channels, ColorTag::Green, &line, RoutingTarget::channel(&channel));

                if victim.eq_ignore_ascii_case(nick) {
                    info!("Kicked from {} by {} ({}); rejoining", channel, kicker, reason);
                    self.send(Outgoing::Join(channel));
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Channels> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self, channels: &Channels, color: ColorTag, line: &str, target: RoutingTarget) {
        self.router
            .append(&channels.store, &channels.directories, color, line, &target);
    }

    fn send(&self, outgoing: Outgoing) {
        if let Err(e) = self.outgoing_tx.send(outgoing) {
            debug!("Transport gone, dropping {:?}", e.0);
        }
    }

    fn send_help(&self, user: &str) {
        for line in HELP_LINES {
            self.send(Outgoing::message(user, *line));
        }
    }

    /// A channel line that starts with the bot's nick and mentions "help".
    fn is_help_request(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        message.starts_with(&self.settings.nick.to_lowercase())
            && message.find("help").is_some_and(|i| i > 0)
    }

    fn handle_private_message(&self, channels: &mut Channels, sender: &str, message: &str) {
        let sink = RoutingTarget::channel(&self.settings.nick);

        match classify_private(message, &self.settings.control_password) {
            PrivateRequest::Authenticated(command) => {
                info!("Authenticated command from {}: {}", sender, command);
                self.process_command(channels, &command, sender);
                let line = format!("<- *{}* {}", sender, command);
                self.log(channels, ColorTag::Black, &line, sink);
            }
            PrivateRequest::Help => {
                self.send_help(sender);
                let line = format!("<- *{}* {}", sender, message);
                self.log(channels, ColorTag::Black, &line, sink);
            }
            PrivateRequest::Unauthenticated => {
                let line = format!("<- *{}* {}", sender, message);
                self.log(channels, ColorTag::Black, &line, sink);
            }
        }
    }

    fn process_command(&self, channels: &mut Channels, command: &str, user: &str) {
        match ControlCommand::parse(command) {
            ControlCommand::Join(channel) => {
                self.send(Outgoing::message(user, format!("joining {}", channel)));
                if !self.join(channels, &channel) {
                    self.send(Outgoing::message(user, format!("failed to join {}", channel)));
                }
            }
            ControlCommand::Leave(channel) => {
                self.send(Outgoing::message(user, format!("leaving {}", channel)));
                self.leave(channels, &channel);
            }
            ControlCommand::Ignore(channel) => {
                if !channels.store.contains(&channel) {
                    self.send(Outgoing::message(user, format!("not logging {}", channel)));
                    return;
                }
                self.send(Outgoing::message(user, format!("ignoring {}", channel)));
                self.send(Outgoing::action(&channel, "is no longer recording this channel"));
                channels.store.set_state(&channel, ChannelState::Ignoring);
            }
            ControlCommand::Listen(channel) => {
                if !channels.store.contains(&channel) {
                    self.send(Outgoing::message(user, format!("not logging {}", channel)));
                    return;
                }
                self.send(Outgoing::message(user, format!("listening to {}", channel)));
                channels.store.set_state(&channel, ChannelState::Listening);
                self.send(Outgoing::action(&channel, "is now recording this channel"));
            }
            ControlCommand::Help => self.send_help(user),
        }
    }

    fn join(&self, channels: &mut Channels, channel: &str) -> bool {
        if channels.store.contains(channel) {
            return true;
        }
        if !channels.directories.try_provision(channel) {
            return false;
        }
        self.send(Outgoing::Join(with_hash(channel)));
        channels.store.set_state(channel, ChannelState::Listening);
        info!("Now logging {}", with_hash(channel));
        true
    }

    fn leave(&self, channels: &mut Channels, channel: &str) {
        if channels.store.remove(channel).is_some() {
            self.send(Outgoing::Part(with_hash(channel)));
            info!("Stopped logging {}", with_hash(channel));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::directory::tests::{make_templates, read_logs};
    use crate::bot::directory::TEMPLATE_FILES;
    use crate::bot::event::ProbeKind;
    use chrono::{Local, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    impl LogBot {
        fn join_channel(&self, channel: &str) -> bool {
            let mut channels = self.lock();
            self.join(&mut channels, channel)
        }

        fn leave_channel(&self, channel: &str) {
            let mut channels = self.lock();
            self.leave(&mut channels, channel);
        }
    }

    struct Harness {
        bot: LogBot,
        rx: mpsc::UnboundedReceiver<Outgoing>,
        out: TempDir,
        templates: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let (h, bootstrapped) = Self::start(make_templates(), tempfile::tempdir().unwrap());
            assert!(bootstrapped);
            h
        }

        /// Build a bot over the given directories and run its bootstrap.
        fn start(templates: TempDir, out: TempDir) -> (Self, bool) {
            let (tx, rx) = mpsc::unbounded_channel();
            let settings = BotSettings {
                nick: "LogBot".to_string(),
                primary_channel: "#a".to_string(),
                join_message: "This channel is logged.".to_string(),
                control_password: "s3cr3t".to_string(),
            };
            let directories =
                ChannelDirectories::new(out.path(), templates.path(), "localhost", "LogBot");
            let bot = LogBot::new(settings, directories, tx);
            let bootstrapped = bot.bootstrap();
            let h = Self {
                bot,
                rx,
                out,
                templates,
            };
            (h, bootstrapped)
        }

        fn sent(&mut self) -> Vec<Outgoing> {
            let mut sent = Vec::new();
            while let Ok(outgoing) = self.rx.try_recv() {
                sent.push(outgoing);
            }
            sent
        }

        fn log(&self, channel: &str) -> String {
            read_logs(self.out.path(), channel)
        }

        fn private(&self, sender: &str, message: &str) {
            self.bot.handle_event(IrcEvent::PrivateMessage {
                sender: sender.to_string(),
                message: message.to_string(),
            });
        }

        fn say(&self, channel: &str, sender: &str, message: &str) {
            self.bot.handle_event(IrcEvent::Message {
                channel: channel.to_string(),
                sender: sender.to_string(),
                message: message.to_string(),
            });
        }
    }

    #[test]
    fn test_bootstrap_listens_on_primary_channel() {
        let h = Harness::new();
        assert_eq!(h.bot.state("a"), Some(ChannelState::Listening));
        assert!(h.out.path().join("a").join("index.php").is_file());
        assert!(h.out.path().join("logbot").join("config.inc.php").is_file());
        assert_eq!(h.bot.nick(), "LogBot");
    }

    #[test]
    fn test_failed_bootstrap_keeps_bot_running() {
        // No templates: neither the sink nor the primary channel can be provisioned
        let (mut h, bootstrapped) =
            Harness::start(tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap());

        assert!(!bootstrapped);
        assert_eq!(h.bot.state("a"), None);

        h.bot.handle_event(IrcEvent::Connected);
        assert!(h.sent().is_empty());
        h.say("#a", "bob", "anyone here?");
        assert!(h.log("a").is_empty());

        // Once the templates exist the operator can still join the channel
        for file in TEMPLATE_FILES {
            fs::write(h.templates.path().join(file), "").unwrap();
        }
        h.private("operator", "join #a s3cr3t");

        assert_eq!(h.bot.state("a"), Some(ChannelState::Listening));
        let sent = h.sent();
        assert_eq!(sent[0], Outgoing::message("operator", "joining #a"));
        assert!(sent.contains(&Outgoing::Join("#a".to_string())));
    }

    #[test]
    fn test_failed_private_sink_still_accepts_commands() {
        let out = tempfile::tempdir().unwrap();
        // A file where the sink directory should go
        fs::write(out.path().join("logbot"), "").unwrap();
        let (mut h, bootstrapped) = Harness::start(make_templates(), out);

        assert!(bootstrapped);
        assert_eq!(h.bot.state("a"), Some(ChannelState::Listening));

        h.private("operator", "join #b s3cr3t");

        assert_eq!(h.bot.state("b"), Some(ChannelState::Listening));
        assert!(h
            .sent()
            .contains(&Outgoing::message("operator", "joining #b")));
        assert!(h.out.path().join("logbot").is_file());
    }

    #[test]
    fn test_channel_names_match_regardless_of_case() {
        let mut h = Harness::new();
        h.private("operator", "join Rust s3cr3t");
        h.sent();

        h.say("#rust", "bob", "lowercase traffic");
        assert!(h.log("#Rust").contains("&lt;bob&gt; lowercase traffic"));

        h.private("operator", "ignore #RUST s3cr3t");
        assert_eq!(h.bot.state("rust"), Some(ChannelState::Ignoring));
    }

    #[test]
    fn test_join_command_scenario() {
        let mut h = Harness::new();
        h.private("operator", "join testchan s3cr3t");

        assert_eq!(h.bot.state("testchan"), Some(ChannelState::Listening));
        assert!(h.out.path().join("testchan").join("config.inc.php").is_file());

        let sent = h.sent();
        assert_eq!(sent[0], Outgoing::message("operator", "joining #testchan"));
        assert!(sent.contains(&Outgoing::Join("#testchan".to_string())));

        // The command is logged without the secret
        let log = h.log("LogBot");
        assert!(log.contains("&lt;- *operator* join testchan"));
        assert!(!log.contains("s3cr3t"));
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut h = Harness::new();
        assert!(h.bot.join_channel("#b"));
        h.sent();

        assert!(h.bot.join_channel("b"));
        assert!(h.sent().is_empty());
        assert_eq!(h.bot.state("#b"), Some(ChannelState::Listening));
    }

    #[test]
    fn test_join_failure_leaves_channel_untracked() {
        let mut h = Harness::new();
        // A file where the directory should go makes provisioning fail
        fs::write(h.out.path().join("blocked"), "").unwrap();

        h.private("operator", "join blocked s3cr3t");

        assert_eq!(h.bot.state("blocked"), None);
        let sent = h.sent();
        assert!(sent.contains(&Outgoing::message("operator", "failed to join #blocked")));
        assert!(!sent.contains(&Outgoing::Join("#blocked".to_string())));
    }

    #[test]
    fn test_ignore_then_listen() {
        let mut h = Harness::new();

        h.private("operator", "ignore #a s3cr3t");
        assert_eq!(h.bot.state("a"), Some(ChannelState::Ignoring));
        let sent = h.sent();
        assert!(sent.contains(&Outgoing::message("operator", "ignoring #a")));
        assert!(sent.contains(&Outgoing::action("#a", "is no longer recording this channel")));

        h.say("#a", "bob", "off the record");
        assert!(!h.log("a").contains("off the record"));

        h.private("operator", "listen a s3cr3t");
        assert_eq!(h.bot.state("a"), Some(ChannelState::Listening));
        let sent = h.sent();
        assert!(sent.contains(&Outgoing::message("operator", "listening to #a")));
        assert!(sent.contains(&Outgoing::action("#a", "is now recording this channel")));

        h.say("#a", "bob", "on the record");
        assert!(h.log("a").contains("&lt;bob&gt; on the record"));
    }

    #[test]
    fn test_ignore_untracked_channel_reports_failure() {
        let mut h = Harness::new();
        h.private("operator", "ignore #nowhere s3cr3t");

        assert_eq!(h.bot.state("nowhere"), None);
        assert!(h
            .sent()
            .contains(&Outgoing::message("operator", "not logging #nowhere")));
    }

    #[test]
    fn test_leave_removes_normalized_key() {
        let mut h = Harness::new();
        h.bot.join_channel("#b");
        h.sent();

        h.private("operator", "leave b s3cr3t");

        assert_eq!(h.bot.state("b"), None);
        let sent = h.sent();
        assert!(sent.contains(&Outgoing::message("operator", "leaving #b")));
        assert!(sent.contains(&Outgoing::Part("#b".to_string())));
    }

    #[test]
    fn test_leave_untracked_sends_no_part() {
        let mut h = Harness::new();
        h.bot.leave_channel("#nowhere");
        assert!(h.sent().is_empty());
    }

    #[test]
    fn test_malformed_command_sends_help() {
        let mut h = Harness::new();
        h.private("operator", "join s3cr3t");

        let sent = h.sent();
        assert_eq!(sent.len(), HELP_LINES.len());
        assert_eq!(sent[0], Outgoing::message("operator", HELP_LINES[0]));
    }

    #[test]
    fn test_plain_help_request() {
        let mut h = Harness::new();
        h.private("visitor", "Help");

        assert_eq!(h.sent().len(), HELP_LINES.len());
        assert!(h.log("LogBot").contains("&lt;- *visitor* Help"));
    }

    #[test]
    fn test_unauthenticated_message_is_only_logged() {
        let mut h = Harness::new();
        h.private("visitor", "join #b wrongpass");

        assert!(h.sent().is_empty());
        assert_eq!(h.bot.state("b"), None);
        assert!(h.log("LogBot").contains("&lt;- *visitor* join #b wrongpass"));
    }

    #[test]
    fn test_quit_goes_to_all_channels() {
        let h = Harness::new();
        h.bot.join_channel("#b");
        h.private("operator", "ignore #b s3cr3t");

        h.bot.handle_event(IrcEvent::Quit {
            sender: "bob".to_string(),
            reason: "bye".to_string(),
        });

        assert!(h.log("a").contains("* bob Quit (bye)"));
        assert!(h.log("b").contains("* bob Quit (bye)"));
    }

    #[test]
    fn test_help_mention_in_channel() {
        let mut h = Harness::new();
        h.say("#a", "bob", "LogBot: help");

        assert_eq!(
            h.sent(),
            vec![Outgoing::message("#a", "This channel is logged.")]
        );

        h.say("#a", "bob", "logbot, can you HELP?");
        assert_eq!(h.sent().len(), 1);

        h.say("#a", "bob", "help LogBot");
        assert!(h.sent().is_empty());
    }

    #[test]
    fn test_join_event_welcome_notice() {
        let mut h = Harness::new();

        h.bot.handle_event(IrcEvent::Join {
            channel: "#a".to_string(),
            sender: "LogBot".to_string(),
        });
        h.bot.handle_event(IrcEvent::Join {
            channel: "#a".to_string(),
            sender: "bob".to_string(),
        });

        assert_eq!(
            h.sent(),
            vec![
                Outgoing::notice("#a", "This channel is logged."),
                Outgoing::notice("bob", "This channel is logged."),
            ]
        );
        let log = h.log("a");
        assert!(log.contains("* LogBot has joined #a"));
        assert!(log.contains("* bob has joined #a"));
        assert!(log.contains("irc-green"));
    }

    #[test]
    fn test_kick_of_bot_rejoins() {
        let mut h = Harness::new();

        h.bot.handle_event(IrcEvent::Kick {
            channel: "#a".to_string(),
            kicker: "op".to_string(),
            victim: "bob".to_string(),
            reason: "spam".to_string(),
        });
        assert!(h.sent().is_empty());

        h.bot.handle_event(IrcEvent::Kick {
            channel: "#a".to_string(),
            kicker: "op".to_string(),
            victim: "logbot".to_string(),
            reason: "bye".to_string(),
        });
        assert_eq!(h.sent(), vec![Outgoing::Join("#a".to_string())]);
        assert!(h.log("a").contains("* bob was kicked from #a by op"));
    }

    #[test]
    fn test_event_templates() {
        let h = Harness::new();
        let events = vec![
            IrcEvent::Action {
                sender: "bob".into(),
                target: "#a".into(),
                action: "waves".into(),
            },
            IrcEvent::Mode {
                channel: "#a".into(),
                setter: "op".into(),
                mode: "+o bob".into(),
            },
            IrcEvent::NickChange {
                old_nick: "bob".into(),
                new_nick: "robert".into(),
            },
            IrcEvent::Notice {
                sender: "op".into(),
                target: "#a".into(),
                notice: "maintenance".into(),
            },
            IrcEvent::Part {
                channel: "#a".into(),
                sender: "carol".into(),
            },
            IrcEvent::Probe {
                sender: "dave".into(),
                target: "#a".into(),
                kind: ProbeKind::Version,
            },
            IrcEvent::TopicChange {
                channel: "#a".into(),
                setter: "op".into(),
                topic: "Rust & friends".into(),
            },
        ];
        for event in events {
            h.bot.handle_event(event);
        }

        let log = h.log("a");
        let expected = [
            ("irc-brick", "* bob waves"),
            ("irc-green", "* op sets mode +o bob"),
            ("irc-green", "* bob is now known as robert"),
            ("irc-brown", "-op- maintenance"),
            ("irc-green", "* carol has left #a"),
            ("irc-red", "[dave VERSION]"),
            ("irc-green", "* op changes topic to 'Rust &amp; friends'"),
        ];
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), expected.len());
        for (line, (class, text)) in lines.iter().zip(expected) {
            assert!(
                line.contains(&format!("<span class=\"{}\">{}</span><br />", class, text)),
                "unexpected line: {}",
                line
            );
        }
    }

    #[test]
    fn test_topic_snapshot_writes_two_lines() {
        let h = Harness::new();
        let set_at = Local.with_ymd_and_hms(2009, 3, 7, 18, 30, 0).unwrap();

        h.bot.handle_event(IrcEvent::TopicSnapshot {
            channel: "#a".into(),
            topic: "Welcome".into(),
            setter: "op".into(),
            set_at,
        });

        let log = h.log("a");
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("* Topic is 'Welcome'"));
        assert!(lines[1].contains("* Set by op on 2009-03-07 18:30:00"));
    }

    #[test]
    fn test_disconnect_and_reconnect() {
        let mut h = Harness::new();
        h.bot.join_channel("#b");
        h.sent();

        h.bot.handle_event(IrcEvent::Disconnected);
        assert!(h.log("a").contains("* Disconnected."));
        assert!(h.log("b").contains("irc-navy"));

        h.bot.handle_event(IrcEvent::Connected);
        let mut joins: Vec<Outgoing> = h.sent();
        joins.sort_by_key(|o| o.to_line());
        assert_eq!(
            joins,
            vec![Outgoing::Join("#a".into()), Outgoing::Join("#b".into())]
        );
    }

    #[test]
    fn test_private_actions_go_to_nick_sink() {
        let h = Harness::new();
        h.bot.handle_event(IrcEvent::Action {
            sender: "bob".into(),
            target: "LogBot".into(),
            action: "pokes you".into(),
        });
        assert!(h.log("LogBot").contains("* bob pokes you"));
    }

    #[test]
    fn test_concurrent_events_do_not_interleave() {
        let h = Harness::new();
        let bot = &h.bot;

        std::thread::scope(|scope| {
            for worker in 0..4 {
                scope.spawn(move || {
                    for i in 0..25 {
                        bot.handle_event(IrcEvent::Message {
                            channel: "#a".into(),
                            sender: format!("user{}", worker),
                            message: format!("message {}", i),
                        });
                    }
                });
            }
        });

        let log = h.log("a");
        assert_eq!(log.lines().count(), 100);
        assert!(log.lines().all(|l| l.starts_with("<span") && l.ends_with("<br />")));
    }
}
