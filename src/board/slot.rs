// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Button slots and the audio clips bound to them.

use std::fmt;

/// Style token stored with every slot. Opaque to the core.
pub const DEFAULT_COLOR: &str =
    "linear-gradient(135deg, var(--primary-color) 0%, var(--button-secondary) 100%)";

/// Identifier of a slot, unique across the whole board
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(String);

impl SlotId {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SlotId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Playback sub-state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    /// Not audible
    #[default]
    Idle,
    /// Audible
    Playing,
    /// Suspended, resumable from the same position
    Paused,
}

impl SlotState {
    /// Whether the slot holds the playback device
    pub fn is_active(&self) -> bool {
        !matches!(self, SlotState::Idle)
    }
}

/// An audio clip: the uploaded bytes plus where they came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    /// Original file name, extension included
    filename: String,
    /// Declared media type (e.g. "audio/mpeg")
    media_type: String,
    /// Encoded audio bytes
    bytes: Vec<u8>,
}

impl Clip {
    /// Create a new clip
    pub fn new(filename: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Original file name
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared media type
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Encoded audio bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the payload in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A button on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    id: SlotId,
    label: String,
    clip: Option<Clip>,
    color: String,
    state: SlotState,
}

impl Slot {
    /// Create an empty slot
    pub fn new(id: impl Into<SlotId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            clip: None,
            color: DEFAULT_COLOR.to_string(),
            state: SlotState::Idle,
        }
    }

    /// Rebuild a slot from stored parts. The state always starts idle.
    pub fn restore(
        id: impl Into<SlotId>,
        label: impl Into<String>,
        clip: Option<Clip>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            clip,
            color: color.into(),
            state: SlotState::Idle,
        }
    }

    /// Slot identifier
    pub fn id(&self) -> &SlotId {
        &self.id
    }

    /// Display label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Bound clip, if any
    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    /// Style token
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Playback sub-state
    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Whether a clip is bound
    pub fn is_loaded(&self) -> bool {
        self.clip.is_some()
    }

    /// Whether no clip is bound
    pub fn is_empty(&self) -> bool {
        self.clip.is_none()
    }

    pub(crate) fn set_state(&mut self, state: SlotState) {
        self.state = state;
    }

    /// Bind a clip, relabel from its file name and go idle
    pub(crate) fn assign(&mut self, clip: Clip) {
        self.label = strip_extension(clip.filename()).to_string();
        self.clip = Some(clip);
        self.state = SlotState::Idle;
    }

    /// Drop the clip, keeping the current label
    pub(crate) fn clear(&mut self) {
        self.clip = None;
        self.color = DEFAULT_COLOR.to_string();
        self.state = SlotState::Idle;
    }
}

/// Remove the last extension from a file name.
///
/// Only a trailing `.ext` with no further dots or slashes is removed, so
/// `a.tar.gz` becomes `a.tar` and `dir.v2/name` is left alone.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) => {
            let ext = &filename[dot + 1..];
            if ext.is_empty() || ext.contains('/') {
                filename
            } else {
                &filename[..dot]
            }
        }
        None => filename,
    }
}
