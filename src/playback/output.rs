// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Every handle owns its own output stream on the default device. The
//! stream callback reads from a shared voice and reports completion over
//! a channel that the controller drains when it polls.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use tracing::{debug, error};

use super::{decode_clip, Completion, PlaybackDevice, PlaybackHandle};
use crate::board::Clip;
use crate::error::{Result, SoundboardError};

/// Playback position and gain shared with the audio callback
#[derive(Debug)]
struct Voice {
    /// Interleaved samples at the stream's rate and channel count
    samples: Vec<f32>,
    /// Next sample index
    position: usize,
    playing: bool,
    volume: f32,
    /// Set once the end has been reported
    finished: bool,
}

impl Voice {
    fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            position: 0,
            playing: false,
            volume: 1.0,
            finished: false,
        }
    }

    /// Fill `out` with the next samples. Returns true when the end is reached.
    fn render<T>(&mut self, out: &mut [T]) -> bool
    where
        T: SizedSample + FromSample<f32>,
    {
        let silence = T::from_sample(0.0f32);
        if !self.playing || self.finished {
            out.iter_mut().for_each(|s| *s = silence);
            return false;
        }

        for sample in out.iter_mut() {
            *sample = match self.samples.get(self.position) {
                Some(value) => {
                    self.position += 1;
                    T::from_sample(value * self.volume)
                }
                None => silence,
            };
        }

        if self.position >= self.samples.len() {
            self.finished = true;
            self.playing = false;
            return true;
        }
        false
    }
}

/// Output device backed by the system's default audio output
#[derive(Debug, Default)]
pub struct CpalDevice;

impl CpalDevice {
    /// Create a device handle factory
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackDevice for CpalDevice {
    fn open(&mut self, clip: &Clip) -> Result<Box<dyn PlaybackHandle>> {
        let audio = decode_clip(clip)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SoundboardError::Playback("no audio output device".to_string()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| SoundboardError::Playback(format!("failed to get default config: {}", e)))?;

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();
        let audio = audio.conform(config.channels, config.sample_rate.0)?;
        debug!(
            clip = clip.filename(),
            channels = config.channels,
            sample_rate = config.sample_rate.0,
            ?sample_format,
            "opening output stream"
        );

        let voice = Arc::new(Mutex::new(Voice::new(audio.samples)));
        let (tx, rx) = mpsc::channel();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, &voice, tx),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, &voice, tx),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, &voice, tx),
            other => Err(SoundboardError::Playback(format!(
                "unsupported sample format: {:?}",
                other
            ))),
        }?;

        Ok(Box::new(CpalHandle {
            stream,
            voice,
            completions: rx,
        }))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    voice: &Arc<Mutex<Voice>>,
    completions: Sender<Completion>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let data_voice = Arc::clone(voice);
    let ended_tx = completions.clone();
    let error_tx = completions;

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let ended = match data_voice.lock() {
                    Ok(mut voice) => voice.render(data),
                    Err(_) => false,
                };
                if ended {
                    let _ = ended_tx.send(Completion::Ended);
                }
            },
            move |err| {
                error!(error = %err, "audio stream error");
                let _ = error_tx.send(Completion::Error(err.to_string()));
            },
            None,
        )
        .map_err(|e| SoundboardError::Playback(format!("failed to build stream: {}", e)))?;

    Ok(stream)
}

/// A clip streaming to the default output
pub struct CpalHandle {
    stream: Stream,
    voice: Arc<Mutex<Voice>>,
    completions: Receiver<Completion>,
}

impl CpalHandle {
    fn with_voice<R>(&self, f: impl FnOnce(&mut Voice) -> R) -> Result<R> {
        let mut voice = self
            .voice
            .lock()
            .map_err(|_| SoundboardError::Playback("failed to acquire voice lock".to_string()))?;
        Ok(f(&mut voice))
    }
}

impl PlaybackHandle for CpalHandle {
    fn play(&mut self) -> Result<()> {
        self.with_voice(|v| v.playing = true)?;
        self.stream
            .play()
            .map_err(|e| SoundboardError::Playback(format!("failed to start stream: {}", e)))
    }

    fn pause(&mut self) {
        let _ = self.with_voice(|v| v.playing = false);
    }

    fn stop(&mut self) {
        let _ = self.with_voice(|v| {
            v.playing = false;
            v.position = 0;
        });
        let _ = self.stream.pause();
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.with_voice(|v| v.volume = volume.clamp(0.0, 1.0));
    }

    fn poll_completion(&mut self) -> Option<Completion> {
        self.completions.try_recv().ok()
    }
}

/// List available audio output devices
pub fn list_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.output_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}

/// Get default device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_voice(samples: Vec<f32>) -> Voice {
        let mut voice = Voice::new(samples);
        voice.playing = true;
        voice
    }

    #[test]
    fn test_render_silence_when_paused() {
        let mut voice = Voice::new(vec![0.5; 4]);
        let mut out = [1.0f32; 4];
        assert!(!voice.render(&mut out));
        assert_eq!(out, [0.0; 4]);
        assert_eq!(voice.position, 0);
    }

    #[test]
    fn test_render_applies_volume() {
        let mut voice = playing_voice(vec![0.5, -0.5, 0.25, 1.0]);
        voice.volume = 0.5;
        let mut out = [0.0f32; 2];
        assert!(!voice.render(&mut out));
        assert_eq!(out, [0.25, -0.25]);
    }

    #[test]
    fn test_render_reports_end_once() {
        let mut voice = playing_voice(vec![0.1, 0.2, 0.3]);
        let mut out = [0.0f32; 4];
        assert!(voice.render(&mut out));
        assert_eq!(out[3], 0.0);
        assert!(!voice.render(&mut out));
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn test_render_integer_format() {
        let mut voice = playing_voice(vec![0.0, 1.0]);
        let mut out = [1i16; 2];
        voice.render(&mut out);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], i16::MAX);
    }

    #[test]
    fn test_list_devices() {
        // Should not panic without audio hardware
        let _ = list_devices();
        let _ = default_device_name();
    }
}
