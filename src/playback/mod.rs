// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback control for the soundboard.
//!
//! This module provides:
//! - The playback device capability ([`PlaybackDevice`], [`PlaybackHandle`])
//! - A controller that keeps at most one slot audible at a time
//! - Audio output via cpal and a headless silent device
//!
//! Each slot moves through `Idle -> Playing -> {Paused, Idle}` and
//! `Paused -> {Playing, Idle}`. Starting any slot first stops whichever
//! slot is active.

pub mod decode;
pub mod output;
pub mod silent;

pub use decode::{decode_clip, DecodedAudio};
pub use output::CpalDevice;
pub use silent::SilentDevice;

use tracing::{debug, info, warn};

use crate::board::{Clip, SlotId, SlotState, Soundboard};
use crate::error::{Result, SoundboardError};

/// Volume applied to every new handle
pub const DEFAULT_VOLUME: f32 = 0.8;

/// How a handle finished on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Played to the end
    Ended,
    /// The device failed mid-playback
    Error(String),
}

/// A playing (or playable) instance of one clip
pub trait PlaybackHandle {
    /// Start or continue from the current position
    fn play(&mut self) -> Result<()>;

    /// Suspend, keeping the position
    fn pause(&mut self);

    /// Halt and rewind to the start
    fn stop(&mut self);

    /// Set output gain (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32);

    /// Completion signal, if the handle has finished on its own
    fn poll_completion(&mut self) -> Option<Completion>;
}

/// Something that can turn a clip into a playback handle
pub trait PlaybackDevice {
    /// Acquire a handle bound to the clip's payload
    fn open(&mut self, clip: &Clip) -> Result<Box<dyn PlaybackHandle>>;
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle slot started playing
    Started,
    /// Playing slot was paused
    Paused,
    /// Paused slot resumed
    Resumed,
    /// Nothing happened (empty slot, or nothing active)
    Ignored,
}

struct ActiveSound {
    slot: SlotId,
    handle: Box<dyn PlaybackHandle>,
}

/// Owns the playback device and the single active handle
pub struct PlaybackController {
    device: Box<dyn PlaybackDevice>,
    active: Option<ActiveSound>,
    volume: f32,
}

impl PlaybackController {
    /// Create a controller driving `device`
    pub fn new(device: Box<dyn PlaybackDevice>) -> Self {
        Self {
            device,
            active: None,
            volume: DEFAULT_VOLUME,
        }
    }

    /// Set the volume for future handles (and the active one)
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.set_volume(volume);
        self
    }

    /// Current volume
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(active) = self.active.as_mut() {
            active.handle.set_volume(self.volume);
        }
    }

    /// Slot currently holding the device
    pub fn active_slot(&self) -> Option<&SlotId> {
        self.active.as_ref().map(|a| &a.slot)
    }

    /// Whether `slot` is the active one
    pub fn is_active(&self, slot: &SlotId) -> bool {
        self.active_slot() == Some(slot)
    }

    /// Play, pause or resume depending on the slot's state.
    ///
    /// Empty slots are ignored.
    pub fn toggle(&mut self, board: &mut Soundboard, slot_id: &SlotId) -> Result<Transition> {
        let slot = board.find_slot(slot_id)?;
        if slot.is_empty() {
            debug!(slot = %slot_id, "toggle on empty slot ignored");
            return Ok(Transition::Ignored);
        }

        match slot.state() {
            SlotState::Playing => self.pause(board, slot_id).map(|_| Transition::Paused),
            SlotState::Paused => self.resume(board, slot_id).map(|_| Transition::Resumed),
            SlotState::Idle => self.start(board, slot_id).map(|_| Transition::Started),
        }
    }

    /// Start a slot from the beginning, stopping whatever else is active
    pub fn start(&mut self, board: &mut Soundboard, slot_id: &SlotId) -> Result<()> {
        // Resolve first so an unknown id does not stop the current sound
        board.find_slot(slot_id)?;
        self.stop_active(board);

        let slot = board.find_slot_mut(slot_id)?;
        let clip = slot
            .clip()
            .ok_or_else(|| SoundboardError::Playback(format!("slot {} has no clip", slot_id)))?;

        let mut handle = self.device.open(clip).map_err(|e| {
            warn!(slot = %slot_id, error = %e, "failed to acquire playback handle");
            e
        })?;
        handle.set_volume(self.volume);
        if let Err(e) = handle.play() {
            warn!(slot = %slot_id, error = %e, "failed to start playback");
            handle.stop();
            return Err(e);
        }

        slot.set_state(SlotState::Playing);
        self.active = Some(ActiveSound {
            slot: slot_id.clone(),
            handle,
        });
        info!(slot = %slot_id, "playback started");
        Ok(())
    }

    /// Pause the active slot
    pub fn pause(&mut self, board: &mut Soundboard, slot_id: &SlotId) -> Result<()> {
        let active = self.require_active(slot_id)?;
        let slot = board.find_slot_mut(slot_id)?;
        if slot.state() != SlotState::Playing {
            return Err(SoundboardError::Playback(format!("slot {} is not playing", slot_id)));
        }

        active.handle.pause();
        slot.set_state(SlotState::Paused);
        info!(slot = %slot_id, "playback paused");
        Ok(())
    }

    /// Resume the active slot from where it was paused
    pub fn resume(&mut self, board: &mut Soundboard, slot_id: &SlotId) -> Result<()> {
        let active = self.require_active(slot_id)?;
        let slot = board.find_slot_mut(slot_id)?;
        if slot.state() != SlotState::Paused {
            return Err(SoundboardError::Playback(format!("slot {} is not paused", slot_id)));
        }

        active.handle.play()?;
        slot.set_state(SlotState::Playing);
        info!(slot = %slot_id, "playback resumed");
        Ok(())
    }

    /// Stop and release the active handle. No-op when idle.
    pub fn stop_active(&mut self, board: &mut Soundboard) -> Option<SlotId> {
        let mut active = self.active.take()?;
        active.handle.stop();
        // The slot may be gone already if the board was replaced
        if let Ok(slot) = board.find_slot_mut(&active.slot) {
            slot.set_state(SlotState::Idle);
        }
        info!(slot = %active.slot, "playback stopped");
        Some(active.slot)
    }

    /// Stop everything and force every slot idle
    pub fn stop_all(&mut self, board: &mut Soundboard) {
        self.stop_active(board);
        board.idle_all();
    }

    /// Drain the active handle's completion signal.
    ///
    /// On natural end or device error the slot goes idle, the handle is
    /// released and the completion is returned.
    pub fn poll(&mut self, board: &mut Soundboard) -> Option<(SlotId, Completion)> {
        let completion = self.active.as_mut()?.handle.poll_completion()?;
        let active = self.active.take()?;

        if let Ok(slot) = board.find_slot_mut(&active.slot) {
            slot.set_state(SlotState::Idle);
        }
        match &completion {
            Completion::Ended => info!(slot = %active.slot, "playback ended"),
            Completion::Error(msg) => warn!(slot = %active.slot, error = %msg, "playback error"),
        }
        Some((active.slot, completion))
    }

    fn require_active(&mut self, slot_id: &SlotId) -> Result<&mut ActiveSound> {
        match self.active.as_mut() {
            Some(active) if &active.slot == slot_id => Ok(active),
            _ => Err(SoundboardError::Playback(format!("slot {} is not active", slot_id))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockDevice;
    use super::*;
    use crate::board::{SectionId, SectionSpec};

    fn setup() -> (
        Soundboard,
        PlaybackController,
        std::rc::Rc<std::cell::RefCell<mock::DeviceLog>>,
    ) {
        let mut board = Soundboard::with_specs(&SectionSpec::defaults());
        for (id, name) in [
            ("btn_section1_0", "a.wav"),
            ("btn_section1_1", "b.wav"),
            ("btn_section3_10", "c.wav"),
        ] {
            board
                .assign_clip(&SlotId::new(id), name, "audio/wav", vec![0; 16])
                .unwrap();
        }
        let (device, log) = MockDevice::new();
        (board, PlaybackController::new(Box::new(device)), log)
    }

    fn state(board: &Soundboard, id: &str) -> SlotState {
        board.find_slot(&SlotId::new(id)).unwrap().state()
    }

    #[test]
    fn test_toggle_cycles_states() {
        let (mut board, mut ctl, _log) = setup();
        let a = SlotId::new("btn_section1_0");

        assert_eq!(ctl.toggle(&mut board, &a).unwrap(), Transition::Started);
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Playing);
        assert_eq!(ctl.active_slot(), Some(&a));

        assert_eq!(ctl.toggle(&mut board, &a).unwrap(), Transition::Paused);
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Paused);
        assert_eq!(ctl.active_slot(), Some(&a));

        assert_eq!(ctl.toggle(&mut board, &a).unwrap(), Transition::Resumed);
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Playing);
        assert_eq!(ctl.active_slot(), Some(&a));
    }

    #[test]
    fn test_toggle_empty_slot_is_ignored() {
        let (mut board, mut ctl, log) = setup();
        let a = SlotId::new("btn_section1_0");
        ctl.toggle(&mut board, &a).unwrap();
        ctl.toggle(&mut board, &a).unwrap();

        let empty = SlotId::new("btn_section2_0");
        assert_eq!(ctl.toggle(&mut board, &empty).unwrap(), Transition::Ignored);
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Paused);
        assert_eq!(ctl.active_slot(), Some(&a));
        assert_eq!(log.borrow().opened.len(), 1);
    }

    #[test]
    fn test_toggle_unknown_slot() {
        let (mut board, mut ctl, _log) = setup();
        let err = ctl.toggle(&mut board, &SlotId::new("missing")).unwrap_err();
        assert!(matches!(err, SoundboardError::NotFound { .. }));
    }

    #[test]
    fn test_start_stops_previous() {
        let ids = ["btn_section1_0", "btn_section1_1", "btn_section3_10"];
        for first in ids {
            for second in ids {
                if first == second {
                    continue;
                }
                let (mut board, mut ctl, _log) = setup();
                ctl.start(&mut board, &SlotId::new(first)).unwrap();
                ctl.start(&mut board, &SlotId::new(second)).unwrap();

                assert_eq!(state(&board, first), SlotState::Idle);
                assert_eq!(state(&board, second), SlotState::Playing);
                assert_eq!(ctl.active_slot(), Some(&SlotId::new(second)));
                let active = board.slots().filter(|s| s.state().is_active()).count();
                assert_eq!(active, 1);
            }
        }
    }

    #[test]
    fn test_start_from_paused_other() {
        let (mut board, mut ctl, log) = setup();
        let a = SlotId::new("btn_section1_0");
        let b = SlotId::new("btn_section1_1");
        ctl.start(&mut board, &a).unwrap();
        ctl.pause(&mut board, &a).unwrap();
        ctl.start(&mut board, &b).unwrap();

        assert_eq!(state(&board, "btn_section1_0"), SlotState::Idle);
        assert!(log.borrow().events.contains(&"stop a.wav".to_string()));
    }

    #[test]
    fn test_volume_applied_to_new_handle() {
        let (mut board, mut ctl, log) = setup();
        ctl.start(&mut board, &SlotId::new("btn_section1_0")).unwrap();
        assert_eq!(log.borrow().volume, Some(DEFAULT_VOLUME));

        ctl.set_volume(1.5);
        assert_eq!(ctl.volume(), 1.0);
        assert_eq!(log.borrow().volume, Some(1.0));
    }

    #[test]
    fn test_open_failure_leaves_nothing_active() {
        let (mut board, mut ctl, log) = setup();
        ctl.start(&mut board, &SlotId::new("btn_section1_0")).unwrap();
        log.borrow_mut().fail_open = true;

        let err = ctl.start(&mut board, &SlotId::new("btn_section1_1")).unwrap_err();
        assert!(matches!(err, SoundboardError::Playback(_)));
        assert_eq!(ctl.active_slot(), None);
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Idle);
        assert_eq!(state(&board, "btn_section1_1"), SlotState::Idle);
    }

    #[test]
    fn test_play_failure_leaves_nothing_active() {
        let (mut board, mut ctl, log) = setup();
        log.borrow_mut().fail_play = true;
        assert!(ctl.start(&mut board, &SlotId::new("btn_section1_0")).is_err());
        assert_eq!(ctl.active_slot(), None);
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Idle);
    }

    #[test]
    fn test_start_empty_slot_fails() {
        let (mut board, mut ctl, _log) = setup();
        let err = ctl.start(&mut board, &SlotId::new("btn_section2_0")).unwrap_err();
        assert!(matches!(err, SoundboardError::Playback(_)));
    }

    #[test]
    fn test_start_unknown_slot_keeps_current() {
        let (mut board, mut ctl, _log) = setup();
        let a = SlotId::new("btn_section1_0");
        ctl.start(&mut board, &a).unwrap();
        assert!(ctl.start(&mut board, &SlotId::new("nope")).is_err());
        assert_eq!(ctl.active_slot(), Some(&a));
    }

    #[test]
    fn test_pause_requires_active_slot() {
        let (mut board, mut ctl, _log) = setup();
        ctl.start(&mut board, &SlotId::new("btn_section1_0")).unwrap();

        let other = SlotId::new("btn_section1_1");
        assert!(ctl.pause(&mut board, &other).is_err());
        assert!(ctl.resume(&mut board, &other).is_err());
        assert_eq!(state(&board, "btn_section1_1"), SlotState::Idle);
    }

    #[test]
    fn test_resume_requires_paused() {
        let (mut board, mut ctl, _log) = setup();
        let a = SlotId::new("btn_section1_0");
        ctl.start(&mut board, &a).unwrap();
        assert!(ctl.resume(&mut board, &a).is_err());
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Playing);
    }

    #[test]
    fn test_stop_active() {
        let (mut board, mut ctl, log) = setup();
        assert_eq!(ctl.stop_active(&mut board), None);

        let a = SlotId::new("btn_section1_0");
        ctl.start(&mut board, &a).unwrap();
        assert_eq!(ctl.stop_active(&mut board), Some(a));
        assert_eq!(ctl.active_slot(), None);
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Idle);
        assert_eq!(log.borrow().events.last().unwrap(), "stop a.wav");
    }

    #[test]
    fn test_stop_all_is_unconditional() {
        let (mut board, mut ctl, _log) = setup();
        ctl.stop_all(&mut board);
        ctl.start(&mut board, &SlotId::new("btn_section3_10")).unwrap();
        ctl.stop_all(&mut board);
        assert!(board.slots().all(|s| s.state() == SlotState::Idle));
        assert_eq!(ctl.active_slot(), None);
    }

    #[test]
    fn test_poll_natural_end() {
        let (mut board, mut ctl, log) = setup();
        let a = SlotId::new("btn_section1_0");
        ctl.start(&mut board, &a).unwrap();
        assert_eq!(ctl.poll(&mut board), None);

        log.borrow_mut().pending = Some(Completion::Ended);
        assert_eq!(ctl.poll(&mut board), Some((a, Completion::Ended)));
        assert_eq!(ctl.active_slot(), None);
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Idle);
    }

    #[test]
    fn test_poll_device_error() {
        let (mut board, mut ctl, log) = setup();
        let a = SlotId::new("btn_section1_0");
        ctl.start(&mut board, &a).unwrap();
        ctl.pause(&mut board, &a).unwrap();

        log.borrow_mut().pending = Some(Completion::Error("unplugged".into()));
        let (slot, completion) = ctl.poll(&mut board).unwrap();
        assert_eq!(slot, a);
        assert!(matches!(completion, Completion::Error(_)));
        assert_eq!(state(&board, "btn_section1_0"), SlotState::Idle);
    }

    #[test]
    fn test_poll_when_idle() {
        let (mut board, mut ctl, _log) = setup();
        assert_eq!(ctl.poll(&mut board), None);
    }

    #[test]
    fn test_sections_untouched_by_playback() {
        let (mut board, mut ctl, _log) = setup();
        ctl.start(&mut board, &SlotId::new("btn_section1_0")).unwrap();
        assert_eq!(board.section(SectionId::Down).unwrap().len(), 4);
    }
}
