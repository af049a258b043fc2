//! Terminal rendering of session events.
//!
//! Status goes to stderr. `quiet` hides everything except problems that
//! stop audio from playing; `-v` adds Morse notation, `-vv` adds protocol
//! chatter (pings, dropped and ignored lines).

use owo_colors::OwoColorize;
use std::time::Duration;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The cancellation signal fired (e.g. Ctrl+C).
    Cancelled,
    /// The server closed the connection.
    RemoteClosed,
}

/// Something worth telling the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Joined {
        channel: String,
    },
    Message {
        sender: String,
        channel: String,
        text: String,
        notation: String,
        duration: Duration,
    },
    PingAnswered {
        payload: String,
    },
    LineDropped {
        reason: String,
    },
    MalformedMessage {
        line: String,
    },
    RenderFailed {
        reason: String,
    },
    PlaybackFailed {
        reason: String,
    },
    Closed {
        reason: CloseReason,
    },
}

impl SessionEvent {
    /// Lowest `-v` count at which the event is shown.
    fn min_verbosity(&self) -> u8 {
        match self {
            SessionEvent::PingAnswered { .. }
            | SessionEvent::LineDropped { .. }
            | SessionEvent::MalformedMessage { .. } => 2,
            _ => 0,
        }
    }

    /// Problems are shown even in quiet mode.
    fn is_problem(&self) -> bool {
        matches!(
            self,
            SessionEvent::RenderFailed { .. } | SessionEvent::PlaybackFailed { .. }
        )
    }

    /// Whether the event should be printed at this output level.
    pub fn is_visible(&self, quiet: bool, verbosity: u8) -> bool {
        if self.is_problem() {
            return true;
        }
        !quiet && verbosity >= self.min_verbosity()
    }
}

/// Format an event as a single terminal line.
pub fn format_event(event: &SessionEvent, verbosity: u8) -> String {
    match event {
        SessionEvent::Joined { channel } => {
            format!("Joined #{}. Listening...", channel.trim_start_matches('#'))
        }
        SessionEvent::Message {
            sender,
            channel,
            text,
            notation,
            duration,
        } => {
            let mut line = format!(
                "{} {}: {}",
                format!("#{}", channel).dimmed(),
                sender.cyan(),
                text
            );
            if verbosity >= 1 && !notation.is_empty() {
                line.push_str(&format!(
                    "\n  {} {}",
                    notation.yellow(),
                    format!("({:.1}s)", duration.as_secs_f64()).dimmed()
                ));
            }
            line
        }
        SessionEvent::PingAnswered { payload } => {
            format!("{}", format!("PING {} → PONG", payload).dimmed())
        }
        SessionEvent::LineDropped { reason } => {
            format!("{} {}", "Dropped line:".yellow(), reason)
        }
        SessionEvent::MalformedMessage { line } => {
            format!("{} {}", "Ignored malformed message:".yellow(), line)
        }
        SessionEvent::RenderFailed { reason } => {
            format!("{} {}", "Cannot render message:".red(), reason)
        }
        SessionEvent::PlaybackFailed { reason } => {
            format!("{} {}", "Playback failed:".red(), reason)
        }
        SessionEvent::Closed { reason } => match reason {
            CloseReason::Cancelled => "Session closed.".to_string(),
            CloseReason::RemoteClosed => {
                format!("{}", "Server closed the connection.".yellow())
            }
        },
    }
}

/// Print an event to stderr if it is visible at this output level.
pub fn render_event(event: &SessionEvent, quiet: bool, verbosity: u8) {
    if event.is_visible(quiet, verbosity) {
        eprintln!("{}", format_event(event, verbosity));
    }
}
