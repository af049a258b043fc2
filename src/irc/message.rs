//! Inbound line classification and outbound frames for Twitch-style IRC.
//!
//! Only the handful of shapes the session acts on are understood:
//!
//! ```text
//! PING :<payload>
//! [@tags ]:<sender>!<ident>@<host> PRIVMSG #<channel> :<payload>
//! :tmi.twitch.tv NOTICE * :Login authentication failed
//! ```
//!
//! Everything else is [`Inbound::Other`].

use crate::defaults;
use crate::error::{ChatMorseError, Result};
use std::fmt;

/// A chat message addressed to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage<'a> {
    pub sender: &'a str,
    pub channel: &'a str,
    pub text: &'a str,
}

/// What a framed line means to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Keepalive; must be answered with [`Outbound::Pong`].
    Ping { payload: &'a str },
    Chat(ChatMessage<'a>),
    /// The server rejected our credentials.
    AuthFailed { reason: &'a str },
    Other,
}

/// Classify one line.
///
/// # Errors
/// Returns `ChatMorseError::UnrecognizedMessageShape` when the line carries a
/// `PRIVMSG` command but not the expected prefix/channel/payload shape.
pub fn parse_line(line: &str) -> Result<Inbound<'_>> {
    if let Some(rest) = line.strip_prefix("PING") {
        if rest.is_empty() || rest.starts_with(' ') {
            let rest = rest.trim_start();
            let payload = rest.strip_prefix(':').unwrap_or(rest);
            return Ok(Inbound::Ping { payload });
        }
        return Ok(Inbound::Other);
    }

    let line = skip_tags(line);
    let Some((prefix, rest)) = line
        .strip_prefix(':')
        .and_then(|l| l.split_once(' '))
    else {
        return Ok(Inbound::Other);
    };
    let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));

    match command {
        "PRIVMSG" => parse_privmsg(prefix, params)
            .map(Inbound::Chat)
            .ok_or_else(|| ChatMorseError::UnrecognizedMessageShape {
                line: line.to_string(),
            }),
        "NOTICE" => {
            let reason = params.split_once(" :").map_or("", |(_, text)| text);
            if reason.contains(defaults::AUTH_FAILED_NOTICE) {
                Ok(Inbound::AuthFailed { reason })
            } else {
                Ok(Inbound::Other)
            }
        }
        _ => Ok(Inbound::Other),
    }
}

/// Drop an IRCv3 `@key=value;... ` tag block, if present.
fn skip_tags(line: &str) -> &str {
    match line.strip_prefix('@') {
        Some(tagged) => tagged.split_once(' ').map_or("", |(_, rest)| rest),
        None => line,
    }
}

/// `sender!ident@host` + `#channel :text`.
fn parse_privmsg<'a>(prefix: &'a str, params: &'a str) -> Option<ChatMessage<'a>> {
    let (sender, user_host) = prefix.split_once('!')?;
    let (ident, host) = user_host.split_once('@')?;
    if sender.is_empty() || ident.is_empty() || host.is_empty() {
        return None;
    }

    let (target, text) = params.split_once(" :")?;
    let channel = target.strip_prefix('#')?;
    if channel.is_empty() || channel.contains(' ') {
        return None;
    }

    Some(ChatMessage {
        sender,
        channel,
        text,
    })
}

/// Frames the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound<'a> {
    Pass(&'a str),
    Nick(&'a str),
    /// Channel name with or without the leading `#`.
    Join(&'a str),
    Pong(&'a str),
}

impl Outbound<'_> {
    /// Wire form including the `\r\n` terminator.
    pub fn to_wire(&self) -> String {
        format!("{}\r\n", self)
    }
}

impl fmt::Display for Outbound<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outbound::Pass(token) => write!(f, "PASS {}", token),
            Outbound::Nick(nick) => write!(f, "NICK {}", nick),
            Outbound::Join(channel) => {
                write!(f, "JOIN #{}", channel.trim_start_matches('#'))
            }
            Outbound::Pong(payload) => write!(f, "PONG :{}", payload),
        }
    }
}
