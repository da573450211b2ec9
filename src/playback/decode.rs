// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Clip decoding via symphonia.
//!
//! Turns a clip's encoded bytes into interleaved f32 samples and adapts
//! them to an output device's channel count and sample rate.

use std::io::Cursor;
use std::time::Duration;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::board::Clip;
use crate::error::{Result, SoundboardError};
use crate::media;

/// Sinc filter length in taps
const SINC_LEN: usize = 256;

/// Decoded PCM audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples in -1.0..=1.0
    pub samples: Vec<f32>,
    /// Number of interleaved channels
    pub channels: u16,
    /// Frames per second
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Playing time
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Remix to `channels` and resample to `sample_rate`.
    ///
    /// Mono is duplicated to every output channel, anything else to mono
    /// is averaged, other layouts map channel by channel and pad with
    /// silence. Resampling uses a windowed sinc filter.
    pub fn conform(&self, channels: u16, sample_rate: u32) -> Result<DecodedAudio> {
        self.remix(channels).resample(sample_rate)
    }

    fn remix(&self, channels: u16) -> DecodedAudio {
        if channels == self.channels || self.channels == 0 || channels == 0 {
            return self.clone();
        }

        let src = self.channels as usize;
        let dst = channels as usize;
        let mut samples = Vec::with_capacity(self.frames() * dst);

        for frame in self.samples.chunks_exact(src) {
            if src == 1 {
                samples.extend(std::iter::repeat(frame[0]).take(dst));
            } else if dst == 1 {
                samples.push(frame.iter().sum::<f32>() / src as f32);
            } else {
                for ch in 0..dst {
                    samples.push(frame.get(ch).copied().unwrap_or(0.0));
                }
            }
        }

        DecodedAudio {
            samples,
            channels,
            sample_rate: self.sample_rate,
        }
    }

    fn resample(self, sample_rate: u32) -> Result<DecodedAudio> {
        if sample_rate == self.sample_rate || self.sample_rate == 0 || sample_rate == 0 {
            return Ok(self);
        }

        let channels = self.channels as usize;
        let in_frames = self.frames();
        if in_frames == 0 {
            return Ok(DecodedAudio {
                samples: Vec::new(),
                channels: self.channels,
                sample_rate,
            });
        }

        let ratio = sample_rate as f64 / self.sample_rate as f64;
        let out_frames = ((in_frames as f64) * ratio).round().max(1.0) as usize;

        // Trailing silence lets the filter flush the last frames
        let mut planar = vec![Vec::with_capacity(in_frames + SINC_LEN); channels];
        for frame in self.samples.chunks_exact(channels) {
            for (ch, sample) in frame.iter().enumerate() {
                planar[ch].push(*sample);
            }
        }
        for channel in &mut planar {
            channel.resize(in_frames + SINC_LEN, 0.0);
        }

        let params = SincInterpolationParameters {
            sinc_len: SINC_LEN,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };
        let mut resampler =
            SincFixedIn::<f32>::new(ratio, 1.0, params, in_frames + SINC_LEN, channels)
                .map_err(|e| SoundboardError::Playback(format!("resampler setup failed: {}", e)))?;
        let delay = resampler.output_delay();
        let output = resampler
            .process(&planar, None)
            .map_err(|e| SoundboardError::Playback(format!("resampling failed: {}", e)))?;

        let available = output
            .first()
            .map(|ch| ch.len().saturating_sub(delay))
            .unwrap_or(0);
        let frames = out_frames.min(available);
        let mut samples = Vec::with_capacity(frames * channels);
        for i in delay..delay + frames {
            for channel in &output {
                samples.push(channel[i]);
            }
        }

        debug!(
            from = self.sample_rate,
            to = sample_rate,
            in_frames,
            out_frames = frames,
            "clip resampled"
        );
        Ok(DecodedAudio {
            samples,
            channels: self.channels,
            sample_rate,
        })
    }
}

/// Decode a clip's payload.
///
/// Fails with a playback error when the payload is not audio symphonia
/// understands or holds no frames.
pub fn decode_clip(clip: &Clip) -> Result<DecodedAudio> {
    let cursor = Cursor::new(clip.bytes().to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.mime_type(clip.media_type());
    if let Some(ext) = media::extension_of(clip.filename()) {
        hint.with_extension(&ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| playback_error(clip, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            SoundboardError::Playback(format!("{}: no audio track", clip.filename()))
        })?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| playback_error(clip, e))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(playback_error(clip, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(clip = clip.filename(), error = e, "skipping undecodable packet");
            }
            Err(e) => return Err(playback_error(clip, e)),
        }
    }

    if samples.is_empty() || channels == 0 || sample_rate == 0 {
        return Err(SoundboardError::Playback(format!(
            "{}: no audio frames",
            clip.filename()
        )));
    }

    let audio = DecodedAudio {
        samples,
        channels,
        sample_rate,
    };
    debug!(
        clip = clip.filename(),
        channels,
        sample_rate,
        frames = audio.frames(),
        "clip decoded"
    );
    Ok(audio)
}

fn playback_error(clip: &Clip, err: SymphoniaError) -> SoundboardError {
    SoundboardError::Playback(format!("{}: {}", clip.filename(), err))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Cursor;

    /// Encode a mono 16-bit WAV with `frames` samples of a ramp
    pub fn wav_bytes(frames: usize, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..frames {
                let value = ((i % 100) as i32 * 300 - 15_000) as i16;
                writer.write_sample(value).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }
}
