//! chatmorse - Twitch chat as Morse code
//!
//! Listens to a chat channel and plays every message as a Morse tone.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod irc;
pub mod morse;
pub mod output;
pub mod pipeline;
pub mod session;

// Pure stages (text → letters → beats → samples)
pub use audio::synth::{ToneParams, Waveform, synthesize};
pub use morse::encoder::{EncodedMessage, encode};
pub use morse::timeline::{Timeline, expand};
pub use pipeline::{MorsePipeline, Rendered};

// Playback backends
pub use audio::player::{CollectorPlayer, Player};
pub use audio::wav::WavFilePlayer;

// Chat session
pub use irc::{Credentials, LineFramer};
pub use session::{Session, SessionReport, SessionState};

// Error handling
pub use error::{ChatMorseError, Result};

// Config
pub use config::Config;

/// Version shown by `--version`: package version plus git short hash when
/// built from a checkout (`"0.1.0+abc1234"`), otherwise `"0.1.0"`.
pub const VERSION: &str = env!("CHATMORSE_VERSION");
