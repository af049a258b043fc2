//! Speaker playback using CPAL (Cross-Platform Audio Library).

use crate::audio::player::Player;
use crate::audio::synth::Waveform;
use crate::error::{ChatMorseError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Extra time allowed past the waveform's length before playback is
/// declared stuck.
const PLAYBACK_GRACE: Duration = Duration::from_secs(2);

/// Silence appended so the device buffer drains before the stream drops.
const TAIL_PADDING: Duration = Duration::from_millis(50);

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Keep JACK from trying to start a server while CPAL probes backends.
///
/// # Safety
/// This modifies environment variables which is safe when called before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// List all available audio output devices.
///
/// # Errors
/// Returns `ChatMorseError::AudioPlayback` if device enumeration fails.
pub fn list_output_devices() -> Result<Vec<String>> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host
            .output_devices()
            .map_err(|e| ChatMorseError::AudioPlayback {
                message: format!("Failed to enumerate output devices: {}", e),
            })?;
        Ok(devices.filter_map(|device| device.name().ok()).collect())
    })
}

/// Interleaved samples waiting to be pulled by the device callback.
struct PlaybackCursor {
    frames: Vec<f32>,
    position: usize,
    done: Option<crossbeam_channel::Sender<()>>,
}

impl PlaybackCursor {
    fn fill<T>(&mut self, data: &mut [T])
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        for slot in data.iter_mut() {
            let value = self.frames.get(self.position).copied().unwrap_or(0.0);
            *slot = <T as cpal::Sample>::from_sample(value);
            self.position += 1;
        }
        if self.position >= self.frames.len()
            && let Some(done) = self.done.take()
        {
            // The player may already have given up waiting
            done.send(()).unwrap_or(());
        }
    }
}

/// Blocking speaker output.
///
/// Tries mono at the waveform's own rate first, then falls back to the
/// device's default config with channel duplication and nearest-sample
/// resampling (lossless enough for a square wave).
pub struct CpalPlayer {
    device: cpal::Device,
}

impl CpalPlayer {
    /// Open an output device by name, or the system default.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host
                    .output_devices()
                    .map_err(|e| ChatMorseError::AudioPlayback {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                devices
                    .into_iter()
                    .find(|dev| dev.name().is_ok_and(|n| n == name))
                    .ok_or_else(|| ChatMorseError::AudioDeviceNotFound {
                        device: name.to_string(),
                    })
            } else {
                host.default_output_device()
                    .ok_or_else(|| ChatMorseError::AudioDeviceNotFound {
                        device: "default".to_string(),
                    })
            }
        })?;

        Ok(Self { device })
    }

    fn build_stream(
        &self,
        waveform: &Waveform,
    ) -> Result<(cpal::Stream, crossbeam_channel::Receiver<()>)> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let tail = padding_samples(waveform.sample_rate());

        let preferred_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(waveform.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };
        let mut frames = waveform.samples().to_vec();
        frames.resize(frames.len() + tail, 0.0);
        let cursor = Arc::new(Mutex::new(PlaybackCursor {
            frames,
            position: 0,
            done: Some(done_tx.clone()),
        }));

        if let Ok(stream) =
            build_typed_stream::<f32>(&self.device, &preferred_config, Arc::clone(&cursor))
        {
            return Ok((stream, done_rx));
        }

        // Fall back to the device's native format
        let default_config =
            self.device
                .default_output_config()
                .map_err(|e| ChatMorseError::AudioPlayback {
                    message: format!("Failed to query default output config: {}", e),
                })?;
        let native_rate = default_config.sample_rate().0;
        let native_channels = usize::from(default_config.channels());
        let stream_config: cpal::StreamConfig = default_config.clone().into();

        let mut frames = convert_for_device(waveform, native_channels, native_rate);
        frames.resize(frames.len() + padding_samples(native_rate) * native_channels, 0.0);
        let cursor = Arc::new(Mutex::new(PlaybackCursor {
            frames,
            position: 0,
            done: Some(done_tx),
        }));

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_typed_stream::<f32>(&self.device, &stream_config, cursor)
            }
            cpal::SampleFormat::I16 => {
                build_typed_stream::<i16>(&self.device, &stream_config, cursor)
            }
            cpal::SampleFormat::U16 => {
                build_typed_stream::<u16>(&self.device, &stream_config, cursor)
            }
            fmt => Err(ChatMorseError::AudioPlayback {
                message: format!(
                    "Unsupported native sample format: {:?}. \
                     Try specifying a device with --device.",
                    fmt
                ),
            }),
        }?;

        Ok((stream, done_rx))
    }
}

fn build_typed_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    cursor: Arc<Mutex<PlaybackCursor>>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if let Ok(mut cursor) = cursor.lock() {
                    cursor.fill(data);
                }
            },
            |err| {
                eprintln!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| ChatMorseError::AudioPlayback {
            message: format!("Failed to build output stream: {}", e),
        })
}

fn padding_samples(sample_rate: u32) -> usize {
    (TAIL_PADDING.as_secs_f64() * f64::from(sample_rate)).round() as usize
}

/// Resample (nearest sample) and duplicate into `channels` interleaved.
fn convert_for_device(waveform: &Waveform, channels: usize, target_rate: u32) -> Vec<f32> {
    let source = waveform.samples();
    let source_rate = waveform.sample_rate();
    if source.is_empty() || source_rate == 0 || channels == 0 {
        return Vec::new();
    }

    let output_len = (source.len() as u64 * u64::from(target_rate) / u64::from(source_rate)) as usize;
    let mut out = Vec::with_capacity(output_len * channels);
    for i in 0..output_len {
        let source_idx = (i as u64 * u64::from(source_rate) / u64::from(target_rate)) as usize;
        let value = source[source_idx.min(source.len() - 1)];
        out.extend(std::iter::repeat_n(value, channels));
    }
    out
}

impl Player for CpalPlayer {
    fn play(&mut self, waveform: &Waveform) -> Result<()> {
        if waveform.is_empty() {
            return Ok(());
        }

        let (stream, done_rx) = self.build_stream(waveform)?;
        stream.play().map_err(|e| ChatMorseError::AudioPlayback {
            message: format!("Failed to start playback: {}", e),
        })?;

        let deadline = waveform.duration() + TAIL_PADDING + PLAYBACK_GRACE;
        let finished = done_rx.recv_timeout(deadline);
        drop(stream);

        finished.map_err(|_| ChatMorseError::AudioPlayback {
            message: format!(
                "Device did not finish playback within {:.1}s",
                deadline.as_secs_f64()
            ),
        })
    }

    fn name(&self) -> &'static str {
        "cpal"
    }
}
