// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Headless playback device.
//!
//! Decodes clips like the real output would, then tracks playing time
//! against the wall clock without producing sound.

use std::time::{Duration, Instant};

use super::{decode_clip, Completion, PlaybackDevice, PlaybackHandle};
use crate::board::Clip;
use crate::error::Result;

/// A device that plays into the void
#[derive(Debug, Default)]
pub struct SilentDevice;

impl SilentDevice {
    /// Create a silent device
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackDevice for SilentDevice {
    fn open(&mut self, clip: &Clip) -> Result<Box<dyn PlaybackHandle>> {
        let audio = decode_clip(clip)?;
        Ok(Box::new(SilentHandle::new(audio.duration())))
    }
}

/// Wall-clock stand-in for a playing clip
#[derive(Debug)]
pub struct SilentHandle {
    duration: Duration,
    /// Time played before the current run
    elapsed: Duration,
    /// Start of the current run, if playing
    started: Option<Instant>,
    volume: f32,
    finished: bool,
}

impl SilentHandle {
    /// Create a handle for a clip of the given length
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            started: None,
            volume: 1.0,
            finished: false,
        }
    }

    /// Time played so far
    pub fn position(&self) -> Duration {
        let running = self.started.map(|s| s.elapsed()).unwrap_or_default();
        (self.elapsed + running).min(self.duration)
    }

    /// Whether the clock is running
    pub fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    /// Current gain
    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl PlaybackHandle for SilentHandle {
    fn play(&mut self) -> Result<()> {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
        }
    }

    fn stop(&mut self) {
        self.started = None;
        self.elapsed = Duration::ZERO;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn poll_completion(&mut self) -> Option<Completion> {
        if self.finished || self.started.is_none() {
            return None;
        }
        if self.position() >= self.duration {
            self.finished = true;
            self.started = None;
            return Some(Completion::Ended);
        }
        None
    }
}
