//! Error types for chatmorse.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatMorseError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Synthesis errors
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    // Protocol errors (contained per line, never fatal to a session)
    #[error("Failed to decode {length}-byte line: {message}")]
    LineDecode { length: usize, message: String },

    #[error("Unrecognized message shape: {line}")]
    UnrecognizedMessageShape { line: String },

    // Connection errors (fatal to a session)
    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // Audio output errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio playback failed: {message}")]
    AudioPlayback { message: String },

    #[error("WAV export failed: {message}")]
    WavExport { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ChatMorseError {
    /// Whether this error must end a session rather than just the current
    /// message or line.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            ChatMorseError::Connection { .. }
                | ChatMorseError::AuthenticationFailed { .. }
                | ChatMorseError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChatMorseError>;
