//! Command-line interface for chatmorse
//!
//! Provides argument parsing using clap derive macros.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Twitch chat as Morse code
#[derive(Parser, Debug)]
#[command(
    name = "chatmorse",
    version = crate::VERSION,
    about = "Twitch chat as Morse code"
)]
pub struct Cli {
    /// Subcommand to execute (default: listen)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: Morse notation, -vv: protocol chatter)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Tone pitch in Hz
    #[arg(long, global = true, value_name = "HZ")]
    pub tone: Option<f32>,

    /// Length of one dot. Examples: 40ms, 60ms, 0.1s
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_dot_duration)]
    pub dot: Option<Duration>,

    /// Peak amplitude, 0.0 to 1.0
    #[arg(long, global = true, value_name = "LEVEL")]
    pub volume: Option<f32>,

    /// Audio output device (see `chatmorse devices`)
    #[arg(long, global = true, value_name = "DEVICE")]
    pub device: Option<String>,

    #[command(flatten)]
    pub listen: ListenArgs,
}

/// Options for listening to a channel
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ListenArgs {
    /// Channel to join, with or without '#'
    #[arg(long, value_name = "CHANNEL")]
    pub channel: Option<String>,

    /// Login name the token belongs to
    #[arg(long, value_name = "NICK")]
    pub nick: Option<String>,

    /// Write each message as a WAV file here instead of playing it
    #[arg(long, value_name = "DIR")]
    pub wav_dir: Option<PathBuf>,
}

/// Parse a dot length.
///
/// Bare numbers are milliseconds; anything else goes through `humantime`
/// (`40ms`, `0.1s`). Dot lengths are configured in whole milliseconds, so
/// finer values are rejected rather than truncated.
fn parse_dot_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let duration = match s.parse::<u64>() {
        Ok(ms) => Duration::from_millis(ms),
        Err(_) => humantime::parse_duration(s).map_err(|e| e.to_string())?,
    };
    if duration.is_zero() {
        return Err("dot duration must be greater than zero".to_string());
    }
    if duration.subsec_nanos() % 1_000_000 != 0 {
        return Err(format!(
            "dot duration must be a whole number of milliseconds, got {}",
            humantime::format_duration(duration)
        ));
    }
    Ok(duration)
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Join the channel and play every message (default)
    Listen(ListenArgs),

    /// Print the Morse notation of TEXT
    Encode {
        /// Text to encode
        text: String,
    },

    /// Play TEXT as Morse on the speakers
    Play {
        /// Text to play
        text: String,
    },

    /// Write TEXT as a Morse WAV file
    Render {
        /// Text to render
        text: String,
        /// Output file
        #[arg(long, short = 'o', value_name = "FILE")]
        out: PathBuf,
    },

    /// List available audio output devices
    Devices,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Dump a commented configuration template
    Dump,
    /// Print the configuration file path
    Path,
}
