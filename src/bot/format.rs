//! Log line formatting.
//!
//! A line goes through three text transforms, in order:
//! 1. [`LineFormatter::strip_formatting`] removes IRC color and style codes
//! 2. [`escape_html`] escapes `&`, `<` and `>`
//! 3. [`LineFormatter::linkify`] wraps URLs in anchors
//!
//! and is then wrapped into a timestamped entry by [`render_entry`].

use chrono::{DateTime, TimeZone};
use fancy_regex::Regex;

/// Semantic category of a log line, rendered as a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    /// Joins, parts, modes, nick and topic changes, kicks.
    Green,
    /// Channel and private messages.
    Black,
    /// Notices.
    Brown,
    /// Quits and disconnects.
    Navy,
    /// Actions (`/me`).
    Brick,
    /// CTCP probes.
    Red,
}

impl ColorTag {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Green => "irc-green",
            Self::Black => "irc-black",
            Self::Brown => "irc-brown",
            Self::Navy => "irc-navy",
            Self::Brick => "irc-brick",
            Self::Red => "irc-red",
        }
    }
}

/// Formatter holding the compiled patterns of the pipeline.
#[derive(Debug, Clone)]
pub struct LineFormatter {
    /// mIRC colors, hex colors, and single-byte style toggles.
    control_pattern: Regex,
    /// `scheme://non-whitespace` for http, https, ftp and irc.
    url_pattern: Regex,
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFormatter {
    pub fn new() -> Self {
        Self {
            control_pattern: Regex::new(
                r"\x03(?:\d{1,2}(?:,\d{1,2})?)?|\x04(?:[0-9a-fA-F]{6}(?:,[0-9a-fA-F]{6})?)?|[\x02\x0F\x11\x16\x1D\x1E\x1F]",
            )
            .unwrap(),
            url_pattern: Regex::new(r"(?i)\b((?:https?|ftp|irc)://\S+)").unwrap(),
        }
    }

    /// Run the whole pipeline over a raw line.
    pub fn format(&self, line: &str) -> String {
        let stripped = self.strip_formatting(line);
        let escaped = escape_html(&stripped);
        self.linkify(&escaped)
    }

    /// Remove IRC formatting and color control codes.
    pub fn strip_formatting(&self, line: &str) -> String {
        self.control_pattern.replace_all(line, "").to_string()
    }

    /// Rewrite every URL into an anchor whose href and text are the URL.
    pub fn linkify(&self, line: &str) -> String {
        self.url_pattern
            .replace_all(line, "<a href=\"$1\">$1</a>")
            .to_string()
    }
}

/// Escape the HTML metacharacters. `&` goes first so the entities produced
/// for `<` and `>` are not escaped again.
pub fn escape_html(line: &str) -> String {
    line.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `H:MM`, 24-hour, no leading zero on the hour.
pub fn format_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%-H:%M").to_string()
}

/// Wrap an already formatted line into a log entry (without line terminator).
pub fn render_entry(time: &str, color: ColorTag, formatted: &str) -> String {
    format!(
        "<span class=\"irc-date\">[{}]</span> <span class=\"{}\">{}</span><br />",
        time,
        color.css_class(),
        formatted
    )
}
