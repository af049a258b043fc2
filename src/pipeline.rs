//! Text → audio pipeline.
//!
//! Composes the three pure stages:
//! encode → expand → synthesize

use crate::audio::synth::{ToneParams, Waveform, synthesize};
use crate::error::Result;
use crate::morse::encoder::{EncodedMessage, encode};
use crate::morse::timeline::{Timeline, expand};

/// Every intermediate of one render, kept for display and tests.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub encoded: EncodedMessage,
    pub timeline: Timeline,
    pub waveform: Waveform,
}

/// Renders chat text into playable audio with fixed tone parameters.
#[derive(Debug, Clone, Default)]
pub struct MorsePipeline {
    params: ToneParams,
}

impl MorsePipeline {
    pub fn new(params: ToneParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ToneParams {
        &self.params
    }

    /// Run all three stages.
    ///
    /// # Errors
    /// Returns `ChatMorseError::InvalidParameter` if the tone parameters
    /// cannot produce audio. Text never causes an error.
    pub fn render(&self, text: &str) -> Result<Rendered> {
        let encoded = encode(text);
        let timeline = expand(&encoded);
        let waveform = synthesize(&timeline, &self.params)?;
        Ok(Rendered {
            encoded,
            timeline,
            waveform,
        })
    }
}
