//! WAV export, both for one-off renders and as a session player.

use crate::audio::player::Player;
use crate::audio::synth::Waveform;
use crate::error::{ChatMorseError, Result};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode a waveform as 16-bit mono PCM into any seekable writer.
pub fn write_wav_to<W: Write + Seek>(writer: W, waveform: &Waveform) -> Result<()> {
    let mut wav_writer = hound::WavWriter::new(writer, wav_spec(waveform.sample_rate()))
        .map_err(|e| ChatMorseError::WavExport {
            message: format!("Failed to start WAV stream: {}", e),
        })?;

    for sample in waveform.to_i16() {
        wav_writer
            .write_sample(sample)
            .map_err(|e| ChatMorseError::WavExport {
                message: format!("Failed to write sample: {}", e),
            })?;
    }

    wav_writer.finalize().map_err(|e| ChatMorseError::WavExport {
        message: format!("Failed to finalize WAV stream: {}", e),
    })
}

/// Write a waveform to a WAV file, replacing any existing file.
pub fn write_wav(path: &Path, waveform: &Waveform) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| ChatMorseError::WavExport {
        message: format!("Failed to create {}: {}", path.display(), e),
    })?;
    write_wav_to(std::io::BufWriter::new(file), waveform)
}

/// Player that writes each waveform to `<dir>/message-NNNN.wav`.
///
/// Useful on headless hosts or for recording a session.
pub struct WavFilePlayer {
    dir: PathBuf,
    next_index: u32,
    last_path: Option<PathBuf>,
}

impl WavFilePlayer {
    /// Create the player, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| ChatMorseError::WavExport {
            message: format!("Failed to create {}: {}", dir.display(), e),
        })?;
        Ok(Self {
            dir,
            next_index: 1,
            last_path: None,
        })
    }

    /// Path of the most recently written file.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl Player for WavFilePlayer {
    fn play(&mut self, waveform: &Waveform) -> Result<()> {
        let path = self
            .dir
            .join(format!("message-{:04}.wav", self.next_index));
        write_wav(&path, waveform)?;
        self.next_index += 1;
        self.last_path = Some(path);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "wav"
    }
}
