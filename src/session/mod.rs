// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The running soundboard.
//!
//! [`Session`] owns the board, the playback controller and the team
//! colors, and is the only entry point front ends use. Any operation that
//! replaces or removes the clip of the active slot stops playback before
//! the board changes.

use std::path::Path;

use tracing::{debug, info};

use crate::board::{SectionSpec, Slot, SlotId, Soundboard};
use crate::error::Result;
use crate::media::{self, Rgb, Upload};
use crate::playback::{Completion, PlaybackController, PlaybackDevice, Transition};
use crate::project::ProjectFile;
use crate::theme::TeamColors;

/// Board, playback and theme for one running soundboard
pub struct Session {
    board: Soundboard,
    playback: PlaybackController,
    theme: TeamColors,
    specs: Vec<SectionSpec>,
}

impl Session {
    /// Create a session with the standard sections
    pub fn new(device: Box<dyn PlaybackDevice>) -> Self {
        Self::with_specs(device, SectionSpec::defaults())
    }

    /// Create a session with custom sections
    pub fn with_specs(device: Box<dyn PlaybackDevice>, specs: Vec<SectionSpec>) -> Self {
        Self {
            board: Soundboard::with_specs(&specs),
            playback: PlaybackController::new(device),
            theme: TeamColors::default(),
            specs,
        }
    }

    /// Set the playback volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.playback.set_volume(volume);
        self
    }

    /// Set the starting team colors
    pub fn with_theme(mut self, theme: TeamColors) -> Self {
        self.theme = theme;
        self
    }

    /// The board
    pub fn board(&self) -> &Soundboard {
        &self.board
    }

    /// Current team colors
    pub fn theme(&self) -> &TeamColors {
        &self.theme
    }

    /// Section layout used by `reset_all`
    pub fn specs(&self) -> &[SectionSpec] {
        &self.specs
    }

    /// Slot currently playing or paused
    pub fn active_slot(&self) -> Option<&SlotId> {
        self.playback.active_slot()
    }

    /// The active slot's record
    pub fn active(&self) -> Option<&Slot> {
        self.active_slot()
            .and_then(|id| self.board.find_slot(id).ok())
    }

    /// Playback volume
    pub fn volume(&self) -> f32 {
        self.playback.volume()
    }

    /// Change playback volume, including the active sound
    pub fn set_volume(&mut self, volume: f32) {
        self.playback.set_volume(volume);
    }

    /// Play, pause or resume a slot
    pub fn toggle(&mut self, slot_id: &SlotId) -> Result<Transition> {
        self.playback.toggle(&mut self.board, slot_id)
    }

    /// Pause or resume whatever is active. Ignored when nothing is.
    pub fn toggle_current(&mut self) -> Result<Transition> {
        match self.playback.active_slot().cloned() {
            Some(slot_id) => self.toggle(&slot_id),
            None => Ok(Transition::Ignored),
        }
    }

    /// Stop the active sound
    pub fn stop(&mut self) -> Option<SlotId> {
        self.playback.stop_active(&mut self.board)
    }

    /// Check whether the active sound has finished
    pub fn poll(&mut self) -> Option<(SlotId, Completion)> {
        self.playback.poll(&mut self.board)
    }

    /// Read an audio file from disk into a slot
    pub fn upload_clip<P: AsRef<Path>>(&mut self, slot_id: &SlotId, path: P) -> Result<&Slot> {
        // Fail on the slot id before touching the file system
        self.board.find_slot(slot_id)?;
        let upload = Upload::audio(path)?;
        self.assign_clip(slot_id, &upload.filename, &upload.media_type, upload.bytes)
    }

    /// Put a clip into a slot, replacing any previous one.
    ///
    /// The media type must be audio. If the slot is playing it is stopped
    /// first.
    pub fn assign_clip(
        &mut self,
        slot_id: &SlotId,
        filename: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<&Slot> {
        media::ensure_audio(media_type)?;
        self.board.find_slot(slot_id)?;
        self.stop_if_active(slot_id);
        self.board.assign_clip(slot_id, filename, media_type, bytes)
    }

    /// Remove a slot's clip, stopping it first if it is active
    pub fn delete_clip(&mut self, slot_id: &SlotId) -> Result<&Slot> {
        self.board.find_slot(slot_id)?;
        self.stop_if_active(slot_id);
        self.board.delete_clip(slot_id)
    }

    /// Stop everything and rebuild an empty board
    pub fn reset_all(&mut self) {
        self.playback.stop_all(&mut self.board);
        self.board.reset_all(&self.specs);
    }

    /// Snapshot the board as a project document
    pub fn export(&self) -> ProjectFile {
        ProjectFile::export(&self.board)
    }

    /// Write the board to a project file
    pub fn save_project<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.export().save(path)
    }

    /// Replace the board with a project document.
    ///
    /// Validation happens first. Playback stops only once the document is
    /// known to be good, so a bad file changes nothing.
    pub fn import(&mut self, project: &ProjectFile) -> Result<()> {
        let sections = project.to_sections()?;
        self.playback.stop_all(&mut self.board);
        self.board.replace_sections(sections);
        info!(
            slots = self.board.slot_count(),
            loaded = self.board.loaded_count(),
            "project loaded"
        );
        Ok(())
    }

    /// Read a project file and replace the board with it
    pub fn load_project<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let project = ProjectFile::load(path)?;
        self.import(&project)
    }

    /// Recolor the theme from a logo file. Returns the palette used.
    pub fn apply_logo<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<Rgb>> {
        let upload = Upload::image(path)?;
        self.apply_logo_bytes(&upload.media_type, &upload.bytes)
    }

    /// Recolor the theme from in-memory image data
    pub fn apply_logo_bytes(&mut self, media_type: &str, bytes: &[u8]) -> Result<Vec<Rgb>> {
        media::ensure_image(media_type)?;
        let palette = media::extract_palette(bytes)?;
        self.theme.apply_palette(&palette);
        info!(
            primary = %self.theme.primary,
            secondary = %self.theme.secondary,
            accent = %self.theme.accent,
            "theme updated from logo"
        );
        Ok(palette)
    }

    fn stop_if_active(&mut self, slot_id: &SlotId) {
        if self.playback.is_active(slot_id) {
            debug!(slot = %slot_id, "stopping active slot before change");
            self.playback.stop_active(&mut self.board);
        }
    }
}
