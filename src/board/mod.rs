// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Soundboard model.
//!
//! The board is a fixed set of sections, each holding a fixed number of
//! button slots. Slots are created once from a list of [`SectionSpec`]s
//! and are only ever reset en masse; clips come and go per slot.

pub mod slot;

pub use slot::{strip_extension, Clip, Slot, SlotId, SlotState, DEFAULT_COLOR};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::error::{Result, SoundboardError};

/// The sections of the board, known at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionId {
    /// Down-and-distance calls
    Down,
    /// Team chants
    Team,
    /// Everything else
    Misc,
    /// Player walk-ups
    Player,
}

impl SectionId {
    /// All sections in display order
    pub const ALL: [SectionId; 4] = [
        SectionId::Down,
        SectionId::Team,
        SectionId::Misc,
        SectionId::Player,
    ];

    /// Key used in project files
    pub fn key(&self) -> &'static str {
        match self {
            SectionId::Down => "section1",
            SectionId::Team => "section2",
            SectionId::Misc => "section3",
            SectionId::Player => "section4",
        }
    }

    /// Human readable title
    pub fn title(&self) -> &'static str {
        match self {
            SectionId::Down => "Downs",
            SectionId::Team => "Team",
            SectionId::Misc => "Miscellaneous",
            SectionId::Player => "Players",
        }
    }

    /// Look up a section by project file key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SectionId {
    type Err = SoundboardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s).ok_or_else(|| SoundboardError::section_not_found(s))
    }
}

/// How a section is laid out when the board is initialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    /// Which section
    pub id: SectionId,
    /// Number of slots
    pub capacity: usize,
    /// Label prefix for generated labels
    pub label_prefix: String,
    /// Number shown on the first generated label
    pub first_label: usize,
}

impl SectionSpec {
    /// Create a section layout with 1-based labels
    pub fn new(id: SectionId, capacity: usize, label_prefix: impl Into<String>) -> Self {
        Self {
            id,
            capacity,
            label_prefix: label_prefix.into(),
            first_label: 1,
        }
    }

    /// Set the number of the first label
    pub fn with_first_label(mut self, first_label: usize) -> Self {
        self.first_label = first_label;
        self
    }

    /// The standard board: 4 downs, 4 team, 50 misc, 60 players (numbered from 0)
    pub fn defaults() -> Vec<SectionSpec> {
        vec![
            SectionSpec::new(SectionId::Down, 4, "Down"),
            SectionSpec::new(SectionId::Team, 4, "Team"),
            SectionSpec::new(SectionId::Misc, 50, "Misc"),
            SectionSpec::new(SectionId::Player, 60, "Player").with_first_label(0),
        ]
    }

    /// Generated id for the slot at `index`
    pub fn slot_id(&self, index: usize) -> SlotId {
        SlotId::new(format!("btn_{}_{}", self.id.key(), index))
    }

    /// Generated label for the slot at `index`
    pub fn slot_label(&self, index: usize) -> String {
        format!("{} {}", self.label_prefix, self.first_label + index)
    }
}

/// A section of the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    capacity: usize,
    slots: Vec<Slot>,
}

impl Section {
    /// Create an empty section
    pub fn new(id: SectionId, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Build a section from stored slots. Capacity grows to fit.
    pub fn with_slots(id: SectionId, capacity: usize, slots: Vec<Slot>) -> Self {
        let capacity = capacity.max(slots.len());
        Self {
            id,
            capacity,
            slots,
        }
    }

    /// Section identifier
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Maximum number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots in display order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the section has no slots yet
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding a clip
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_loaded()).count()
    }

    fn fill(&mut self, spec: &SectionSpec) {
        let count = spec.capacity.min(self.capacity);
        for index in 0..count {
            self.slots.push(Slot::new(spec.slot_id(index), spec.slot_label(index)));
        }
    }
}

/// The in-memory board: every section and slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Soundboard {
    sections: BTreeMap<SectionId, Section>,
}

impl Soundboard {
    /// Create a board with no sections
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board initialized from `specs`
    pub fn with_specs(specs: &[SectionSpec]) -> Self {
        let mut board = Self::new();
        board.initialize(specs);
        board
    }

    /// Create empty slots for every section that has none yet.
    ///
    /// Sections that already hold slots are left untouched so loaded
    /// clips survive a second call.
    pub fn initialize(&mut self, specs: &[SectionSpec]) {
        for spec in specs {
            let section = self
                .sections
                .entry(spec.id)
                .or_insert_with(|| Section::new(spec.id, spec.capacity));

            if !section.is_empty() {
                debug!(section = %spec.id, "section already populated, skipping");
                continue;
            }

            section.fill(spec);
            debug!(section = %spec.id, slots = section.len(), "section initialized");
        }
    }

    /// Drop every slot and clip, then initialize again
    pub fn reset_all(&mut self, specs: &[SectionSpec]) {
        self.sections.clear();
        self.initialize(specs);
        info!(slots = self.slot_count(), "board reset");
    }

    /// Replace every section wholesale
    pub fn replace_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections.into_iter().map(|s| (s.id(), s)).collect();
    }

    /// Bind a clip to a slot.
    ///
    /// The label becomes the file name without its extension and the slot
    /// goes idle. Stopping any playback of this slot is the caller's job.
    pub fn assign_clip(
        &mut self,
        slot_id: &SlotId,
        filename: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<&Slot> {
        let slot = self.find_slot_mut(slot_id)?;
        slot.assign(Clip::new(filename, media_type, bytes));
        info!(slot = %slot_id, filename, "clip assigned");
        Ok(&*slot)
    }

    /// Remove the clip from a slot, keeping its label
    pub fn delete_clip(&mut self, slot_id: &SlotId) -> Result<&Slot> {
        let slot = self.find_slot_mut(slot_id)?;
        slot.clear();
        info!(slot = %slot_id, "clip deleted");
        Ok(&*slot)
    }

    /// Look up a slot in any section
    pub fn find_slot(&self, slot_id: &SlotId) -> Result<&Slot> {
        self.sections
            .values()
            .flat_map(|section| section.slots.iter())
            .find(|slot| slot.id() == slot_id)
            .ok_or_else(|| SoundboardError::slot_not_found(slot_id.as_str()))
    }

    /// Look up a slot in any section, mutably
    pub fn find_slot_mut(&mut self, slot_id: &SlotId) -> Result<&mut Slot> {
        self.sections
            .values_mut()
            .flat_map(|section| section.slots.iter_mut())
            .find(|slot| slot.id() == slot_id)
            .ok_or_else(|| SoundboardError::slot_not_found(slot_id.as_str()))
    }

    /// Get a section
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    /// All sections in display order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Slot at a position within a section
    pub fn slot_at(&self, section: SectionId, index: usize) -> Option<&Slot> {
        self.sections.get(&section).and_then(|s| s.slots.get(index))
    }

    /// Every slot on the board
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.sections.values().flat_map(|s| s.slots.iter())
    }

    /// Total number of slots
    pub fn slot_count(&self) -> usize {
        self.sections.values().map(Section::len).sum()
    }

    /// Number of slots holding a clip
    pub fn loaded_count(&self) -> usize {
        self.sections.values().map(Section::loaded_count).sum()
    }

    /// Set every slot idle
    pub(crate) fn idle_all(&mut self) {
        for slot in self.sections.values_mut().flat_map(|s| s.slots.iter_mut()) {
            slot.set_state(SlotState::Idle);
        }
    }
}
