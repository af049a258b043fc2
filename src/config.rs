use crate::audio::synth::ToneParams;
use crate::defaults;
use crate::error::ChatMorseError;
use crate::irc::connection::Credentials;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub irc: IrcConfig,
    pub tone: ToneConfig,
    pub output: OutputConfig,
}

/// Chat server and login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IrcConfig {
    pub server: String,
    pub port: u16,
    pub nickname: String,
    pub token: String,
    pub channel: String,
}

/// Morse tone and timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToneConfig {
    pub frequency_hz: f32,
    pub dot_duration_ms: u64,
    pub volume: f32,
    pub sample_rate: u32,
}

/// Where rendered audio goes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output device name; system default when unset.
    pub device: Option<String>,
    /// Write each message as a WAV file here instead of playing it.
    pub wav_dir: Option<PathBuf>,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: defaults::IRC_SERVER.to_string(),
            port: defaults::IRC_PORT,
            nickname: String::new(),
            token: String::new(),
            channel: String::new(),
        }
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: defaults::TONE_FREQUENCY_HZ,
            dot_duration_ms: defaults::DOT_DURATION_MS,
            volume: defaults::VOLUME,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

const TEMPLATE: &str = r#"# chatmorse configuration
# Location: ~/.config/chatmorse/config.toml

[irc]
server = "irc.chat.twitch.tv"
port = 6667
# Twitch login name of the account the token belongs to
nickname = ""
# OAuth token including the "oauth:" prefix (or set CHATMORSE_TOKEN)
token = ""
# Channel to listen to, with or without '#'
channel = ""

[tone]
# Pitch of the tone in Hz
frequency_hz = 650.0
# Length of one dot; 40 ms is 30 WPM
dot_duration_ms = 40
# Peak amplitude, 0.0 to 1.0
volume = 0.2
sample_rate = 44100

[output]
# device = "pipewire"
# wav_dir = "/tmp/chatmorse"
"#;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns `ConfigFileNotFound` if the file is missing and an error if it
    /// contains invalid TOML. Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ChatMorseError::ConfigFileNotFound {
                path: path.display().to_string(),
            },
            _ => ChatMorseError::Io(e),
        })?;
        let config: Config = toml::from_str(&contents).map_err(ChatMorseError::from)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if matches!(
                    e.downcast_ref::<ChatMorseError>(),
                    Some(ChatMorseError::ConfigFileNotFound { .. })
                ) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CHATMORSE_TOKEN → irc.token
    /// - CHATMORSE_NICK → irc.nickname
    /// - CHATMORSE_CHANNEL → irc.channel
    /// - CHATMORSE_SERVER → irc.server
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var("CHATMORSE_TOKEN")
            && !token.is_empty()
        {
            self.irc.token = token;
        }

        if let Ok(nickname) = std::env::var("CHATMORSE_NICK")
            && !nickname.is_empty()
        {
            self.irc.nickname = nickname;
        }

        if let Ok(channel) = std::env::var("CHATMORSE_CHANNEL")
            && !channel.is_empty()
        {
            self.irc.channel = channel;
        }

        if let Ok(server) = std::env::var("CHATMORSE_SERVER")
            && !server.is_empty()
        {
            self.irc.server = server;
        }

        self
    }

    /// Check that everything needed to log in is present.
    pub fn validate(&self) -> Result<(), ChatMorseError> {
        let required = [
            ("irc.server", &self.irc.server),
            ("irc.nickname", &self.irc.nickname),
            ("irc.token", &self.irc.token),
            ("irc.channel", &self.irc.channel),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ChatMorseError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        if self.irc.channel.trim_start_matches('#').is_empty() {
            return Err(ChatMorseError::ConfigInvalidValue {
                key: "irc.channel".to_string(),
                message: "must name a channel".to_string(),
            });
        }
        Ok(())
    }

    /// Synthesis parameters from the `[tone]` section.
    pub fn tone_params(&self) -> ToneParams {
        ToneParams {
            frequency_hz: self.tone.frequency_hz,
            dot_duration: Duration::from_millis(self.tone.dot_duration_ms),
            sample_rate: self.tone.sample_rate,
            volume: self.tone.volume,
        }
    }

    /// Login details from the `[irc]` section.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            token: self.irc.token.clone(),
            nickname: self.irc.nickname.clone(),
            channel: self.irc.channel.clone(),
        }
    }

    /// Commented default configuration.
    pub fn dump_template() -> &'static str {
        TEMPLATE
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/chatmorse/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatmorse")
            .join("config.toml")
    }
}
