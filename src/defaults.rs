//! Default configuration constants for chatmorse.
//!
//! Shared between the config structs, the CLI and the synthesizer so every
//! entry point starts from the same values.

/// Default IRC server (Twitch chat gateway, plaintext).
pub const IRC_SERVER: &str = "irc.chat.twitch.tv";

/// Default IRC port.
pub const IRC_PORT: u16 = 6667;

/// Default tone pitch in Hz.
///
/// 650 Hz sits in the 500–800 Hz band most CW operators use for sidetone.
pub const TONE_FREQUENCY_HZ: f32 = 650.0;

/// Default dot duration in milliseconds.
///
/// 40 ms per dot is 30 WPM using the PARIS standard (1200 / 40).
pub const DOT_DURATION_MS: u64 = 40;

/// Default output volume (0.0 to 1.0).
///
/// Square waves are harsh at full scale; 0.2 keeps playback comfortable.
pub const VOLUME: f32 = 0.2;

/// Default output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44100;

/// Size of a single socket read.
pub const READ_CHUNK_BYTES: usize = 2048;

/// Twitch NOTICE text sent when PASS/NICK are rejected.
pub const AUTH_FAILED_NOTICE: &str = "Login authentication failed";

/// Words per minute for a dot duration, using the 50-unit PARIS word.
pub fn words_per_minute(dot_duration_ms: u64) -> f64 {
    if dot_duration_ms == 0 {
        return 0.0;
    }
    1200.0 / dot_duration_ms as f64
}
