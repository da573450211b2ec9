// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! A soundboard: sections of button slots, each holding one audio clip,
//! with at most one clip audible at a time and the whole board saved to a
//! single JSON project file.

pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod media;
pub mod playback;
pub mod project;
pub mod session;
pub mod theme;
pub mod ui;

pub use board::{Clip, Section, SectionId, SectionSpec, Slot, SlotId, SlotState, Soundboard};
pub use error::{Result, SoundboardError};
pub use playback::{Completion, PlaybackController, PlaybackDevice, PlaybackHandle, Transition};
pub use project::ProjectFile;
pub use session::Session;
pub use theme::TeamColors;
