//! Square-wave synthesis from a beat timeline.

use crate::defaults;
use crate::error::{ChatMorseError, Result};
use crate::morse::timeline::{Beat, Timeline};
use std::time::Duration;

/// Tone and timing parameters for one synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneParams {
    pub frequency_hz: f32,
    pub dot_duration: Duration,
    pub sample_rate: u32,
    /// Peak amplitude, clamped into `0.0..=1.0`.
    pub volume: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            frequency_hz: defaults::TONE_FREQUENCY_HZ,
            dot_duration: Duration::from_millis(defaults::DOT_DURATION_MS),
            sample_rate: defaults::SAMPLE_RATE,
            volume: defaults::VOLUME,
        }
    }
}

impl ToneParams {
    /// Reject parameters that cannot produce a tone.
    pub fn validate(&self) -> Result<()> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(ChatMorseError::InvalidParameter {
                name: "frequency_hz".to_string(),
                message: format!("must be a positive number, got {}", self.frequency_hz),
            });
        }
        if self.sample_rate == 0 {
            return Err(ChatMorseError::InvalidParameter {
                name: "sample_rate".to_string(),
                message: "must be positive, got 0".to_string(),
            });
        }
        if self.dot_duration.is_zero() {
            return Err(ChatMorseError::InvalidParameter {
                name: "dot_duration".to_string(),
                message: "must be positive, got 0".to_string(),
            });
        }
        if self.unit_samples_exact() >= usize::MAX as f64 {
            return Err(ChatMorseError::InvalidParameter {
                name: "dot_duration".to_string(),
                message: format!(
                    "{:?} at {} Hz does not fit in a sample buffer",
                    self.dot_duration, self.sample_rate
                ),
            });
        }
        Ok(())
    }

    /// Samples in one dot unit: `round(dot_secs × sample_rate)`.
    pub fn samples_per_unit(&self) -> usize {
        self.unit_samples_exact().round() as usize
    }

    fn unit_samples_exact(&self) -> f64 {
        self.dot_duration.as_secs_f64() * f64::from(self.sample_rate)
    }

    fn amplitude(&self) -> f32 {
        if self.volume.is_nan() {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0)
        }
    }
}

/// Mono f32 samples at a fixed rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// 16-bit PCM conversion for WAV export.
    pub fn to_i16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .collect()
    }
}

/// Render a timeline as a square wave.
///
/// The per-unit sample count is computed once, so the output length is
/// exactly `timeline.len() * params.samples_per_unit()`. Consecutive tone
/// beats form one phase-continuous run; phase restarts at each run.
pub fn synthesize(timeline: &Timeline, params: &ToneParams) -> Result<Waveform> {
    params.validate()?;

    let samples_per_unit = params.samples_per_unit();
    let amplitude = params.amplitude();
    let cycles_per_sample = f64::from(params.frequency_hz) / f64::from(params.sample_rate);

    let total = timeline
        .len()
        .checked_mul(samples_per_unit)
        .ok_or_else(|| oversized(params))?;
    let mut samples = Vec::new();
    samples
        .try_reserve_exact(total)
        .map_err(|_| oversized(params))?;
    for (beat, units) in timeline.runs() {
        // Bounded by `total`
        let count = units * samples_per_unit;
        match beat {
            Beat::Tone => samples.extend(
                (0..count).map(|n| square_sample(n, cycles_per_sample, amplitude)),
            ),
            Beat::Silence => samples.resize(samples.len() + count, 0.0),
        }
    }

    Ok(Waveform::new(samples, params.sample_rate))
}

fn oversized(params: &ToneParams) -> ChatMorseError {
    ChatMorseError::InvalidParameter {
        name: "dot_duration".to_string(),
        message: format!(
            "{:?} per dot at {} Hz needs more memory than is available",
            params.dot_duration, params.sample_rate
        ),
    }
}

/// High for the first half of each period, low for the second.
fn square_sample(n: usize, cycles_per_sample: f64, amplitude: f32) -> f32 {
    let phase = (n as f64 * cycles_per_sample).fract();
    if phase < 0.5 { amplitude } else { -amplitude }
}
