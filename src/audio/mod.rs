//! Waveform synthesis and playback backends.

#[cfg(feature = "cpal-audio")]
pub mod output;
pub mod player;
pub mod synth;
pub mod wav;

pub use player::{CollectorPlayer, Player};
pub use synth::{ToneParams, Waveform, synthesize};
