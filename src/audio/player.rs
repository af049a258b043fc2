use crate::audio::synth::Waveform;
use crate::error::{ChatMorseError, Result};

/// Trait for audio output backends.
///
/// `play` blocks until the whole waveform has been rendered, which is what
/// keeps a session strictly one-message-at-a-time.
pub trait Player: Send {
    /// Play the waveform to completion.
    ///
    /// # Returns
    /// Ok(()) once playback has finished, or an error if the backend failed
    fn play(&mut self, waveform: &Waveform) -> Result<()>;

    /// Short backend name for status output.
    fn name(&self) -> &'static str;
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn play(&mut self, waveform: &Waveform) -> Result<()> {
        (**self).play(waveform)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Player that keeps every waveform instead of sounding it.
#[derive(Debug, Clone, Default)]
pub struct CollectorPlayer {
    played: Vec<Waveform>,
    failure: Option<String>,
}

impl CollectorPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the player to fail every `play` call with this message.
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn played(&self) -> &[Waveform] {
        &self.played
    }
}

impl Player for CollectorPlayer {
    fn play(&mut self, waveform: &Waveform) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(ChatMorseError::AudioPlayback {
                message: message.clone(),
            });
        }
        self.played.push(waveform.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
