// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Project files.
//!
//! A project is a single JSON document holding every section, slot and
//! clip. Clip bytes are embedded as base64 data URLs so the file is self
//! contained.
//!
//! ```json
//! {
//!   "sections": {
//!     "section1": { "buttons": [ ... ], "maxButtons": 4 }
//!   },
//!   "timestamp": "2026-10-18T19:04:11.000Z",
//!   "version": "1.1"
//! }
//! ```

pub mod encoding;

pub use encoding::{parse_data_url, to_data_url};

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::board::{Clip, Section, SectionId, Slot, SlotState, Soundboard, DEFAULT_COLOR};
use crate::error::{Result, SoundboardError};

/// Format version written by `export`
pub const PROJECT_VERSION: &str = "1.1";

/// Root of a project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Sections keyed by wire key (`section1`..`section4`)
    pub sections: BTreeMap<String, SectionRecord>,
    /// ISO-8601 export time
    #[serde(default)]
    pub timestamp: String,
    /// Format version
    #[serde(default)]
    pub version: String,
}

/// One section of a project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    /// Slots in display order
    pub buttons: Vec<ButtonRecord>,
    /// Declared capacity
    #[serde(default)]
    pub max_buttons: Option<usize>,
}

/// One slot of a project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonRecord {
    /// Slot identifier
    pub id: String,
    /// Display label
    pub label: String,
    /// Original clip filename, null when empty
    #[serde(default)]
    pub sound_file: Option<String>,
    /// Clip as a data URL, null when empty
    #[serde(default)]
    pub sound_data: Option<String>,
    /// Style token
    #[serde(default = "default_color")]
    pub color: String,
    /// Playing when exported
    #[serde(default)]
    pub is_playing: bool,
    /// Paused when exported
    #[serde(default)]
    pub is_paused: bool,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl ButtonRecord {
    fn from_slot(slot: &Slot) -> Self {
        let clip = slot.clip();
        Self {
            id: slot.id().to_string(),
            label: slot.label().to_string(),
            sound_file: clip.map(|c| c.filename().to_string()),
            sound_data: clip.map(|c| to_data_url(c.media_type(), c.bytes())),
            color: slot.color().to_string(),
            is_playing: slot.state() == SlotState::Playing,
            is_paused: slot.state() == SlotState::Paused,
        }
    }

    fn to_slot(&self) -> Result<Slot> {
        let clip = match &self.sound_data {
            Some(url) => {
                let (media_type, bytes) = parse_data_url(url).map_err(|e| {
                    SoundboardError::InvalidFormat(format!("button {}: {}", self.id, e))
                })?;
                let filename = self.sound_file.clone().unwrap_or_else(|| self.label.clone());
                Some(Clip::new(filename, media_type, bytes))
            }
            None => {
                if self.sound_file.is_some() {
                    warn!(button = %self.id, "sound file without sound data, slot left empty");
                }
                None
            }
        };
        Ok(Slot::restore(
            self.id.as_str(),
            self.label.as_str(),
            clip,
            self.color.as_str(),
        ))
    }
}

impl ProjectFile {
    /// Snapshot the board, stamped with the current time
    pub fn export(board: &Soundboard) -> Self {
        Self::export_at(board, Utc::now())
    }

    /// Snapshot the board with an explicit timestamp
    pub fn export_at(board: &Soundboard, timestamp: DateTime<Utc>) -> Self {
        let sections = board
            .sections()
            .map(|section| {
                let record = SectionRecord {
                    buttons: section.slots().iter().map(ButtonRecord::from_slot).collect(),
                    max_buttons: Some(section.capacity()),
                };
                (section.id().key().to_string(), record)
            })
            .collect();

        Self {
            sections,
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: PROJECT_VERSION.to_string(),
        }
    }

    /// Parse a document.
    ///
    /// Sections with unknown keys are dropped with a warning. Anything
    /// else that does not match the expected shape is `InvalidFormat`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| SoundboardError::InvalidFormat(format!("not valid JSON: {}", e)))?;
        let root = value
            .as_object()
            .ok_or_else(|| SoundboardError::InvalidFormat("document is not an object".into()))?;
        let raw_sections = root
            .get("sections")
            .ok_or_else(|| SoundboardError::InvalidFormat("missing sections".into()))?
            .as_object()
            .ok_or_else(|| SoundboardError::InvalidFormat("sections is not an object".into()))?;

        let mut sections = BTreeMap::new();
        for (key, raw) in raw_sections {
            if SectionId::from_key(key).is_none() {
                warn!(section = %key, "ignoring unknown section");
                continue;
            }
            let record: SectionRecord = serde_json::from_value(raw.clone())
                .map_err(|e| SoundboardError::InvalidFormat(format!("{}: {}", key, e)))?;
            sections.insert(key.clone(), record);
        }

        let text = |field: &str| {
            root.get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let project = Self {
            sections,
            timestamp: text("timestamp"),
            version: text("version"),
        };
        if project.version != PROJECT_VERSION {
            warn!(version = %project.version, "unexpected project version, loading anyway");
        }
        Ok(project)
    }

    /// Serialize with two-space indentation
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SoundboardError::InvalidFormat(format!("failed to serialize: {}", e)))
    }

    /// Read and parse a project file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let project = Self::from_json(&contents)?;
        debug!(path = ?path.as_ref(), "project file read");
        Ok(project)
    }

    /// Write the document to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        info!(path = ?path.as_ref(), "project saved");
        Ok(())
    }

    /// Build sections from the document.
    ///
    /// Only the sections present in the document are built, in board
    /// order. Slot ids must be unique across the whole document. Capacity
    /// is `maxButtons`, raised to the number of buttons when that is
    /// larger. Every slot starts idle.
    pub fn to_sections(&self) -> Result<Vec<Section>> {
        let mut seen = HashSet::new();
        let mut sections = Vec::with_capacity(SectionId::ALL.len());

        for id in SectionId::ALL {
            let Some(record) = self.sections.get(id.key()) else {
                debug!(section = %id, "section absent from document");
                continue;
            };

            let mut slots = Vec::with_capacity(record.buttons.len());
            for button in &record.buttons {
                if !seen.insert(button.id.as_str()) {
                    return Err(SoundboardError::InvalidFormat(format!(
                        "duplicate button id {}",
                        button.id
                    )));
                }
                slots.push(button.to_slot()?);
            }

            let capacity = record.max_buttons.unwrap_or(slots.len());
            sections.push(Section::with_slots(id, capacity, slots));
        }
        Ok(sections)
    }

    /// File name offered when saving on `date`
    pub fn default_file_name(date: NaiveDate) -> String {
        format!("knights-soundboard-{}.json", date.format("%Y-%m-%d"))
    }
}

/// Replace the board's sections with the document's.
///
/// The document is fully validated first, so a failure leaves the board
/// untouched. Stopping playback beforehand is the caller's job.
pub fn import(board: &mut Soundboard, project: &ProjectFile) -> Result<()> {
    let sections = project.to_sections()?;
    board.replace_sections(sections);
    info!(
        slots = board.slot_count(),
        loaded = board.loaded_count(),
        "project imported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{SectionSpec, SlotId};
    use chrono::TimeZone;

    fn loaded_board() -> Soundboard {
        let mut board = Soundboard::with_specs(&SectionSpec::defaults());
        board
            .assign_clip(&SlotId::new("btn_section1_0"), "touchdown.mp3", "audio/mpeg", vec![1, 2, 3])
            .unwrap();
        board
            .assign_clip(&SlotId::new("btn_section4_7"), "walkup.wav", "audio/wav", vec![9; 64])
            .unwrap();
        board
    }

    #[test]
    fn test_export_shape() {
        let board = loaded_board();
        let when = Utc.with_ymd_and_hms(2026, 10, 18, 19, 4, 11).unwrap();
        let project = ProjectFile::export_at(&board, when);

        assert_eq!(project.version, "1.1");
        assert_eq!(project.timestamp, "2026-10-18T19:04:11.000Z");
        assert_eq!(project.sections.len(), 4);
        assert_eq!(project.sections["section3"].max_buttons, Some(50));

        let first = &project.sections["section1"].buttons[0];
        assert_eq!(first.label, "touchdown");
        assert_eq!(first.sound_file.as_deref(), Some("touchdown.mp3"));
        assert_eq!(first.sound_data.as_deref(), Some("data:audio/mpeg;base64,AQID"));

        let empty = &project.sections["section1"].buttons[1];
        assert_eq!(empty.sound_file, None);
        assert_eq!(empty.sound_data, None);
    }

    #[test]
    fn test_json_keys_and_nulls() {
        let board = Soundboard::with_specs(&SectionSpec::defaults());
        let json = ProjectFile::export(&board).to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        let button = &value["sections"]["section2"]["buttons"][0];
        assert_eq!(button["id"], "btn_section2_0");
        assert_eq!(button["label"], "Team 1");
        assert!(button["soundFile"].is_null());
        assert!(button["soundData"].is_null());
        assert_eq!(button["isPlaying"], false);
        assert_eq!(button["isPaused"], false);
        assert_eq!(value["sections"]["section4"]["maxButtons"], 60);
        assert!(json.contains("\n  \"sections\""));
    }

    #[test]
    fn test_round_trip() {
        let board = loaded_board();
        let json = ProjectFile::export(&board).to_json().unwrap();

        let mut restored = Soundboard::new();
        import(&mut restored, &ProjectFile::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored, board);
    }

    #[test]
    fn test_missing_sections() {
        let err = ProjectFile::from_json(r#"{"version":"1.1"}"#).unwrap_err();
        assert!(matches!(err, SoundboardError::InvalidFormat(_)));

        let err = ProjectFile::from_json(r#"{"sections":[]}"#).unwrap_err();
        assert!(matches!(err, SoundboardError::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_buttons() {
        let err = ProjectFile::from_json(r#"{"sections":{"section1":{"maxButtons":4}}}"#)
            .unwrap_err();
        assert!(matches!(err, SoundboardError::InvalidFormat(_)));
    }

    #[test]
    fn test_button_needs_id_and_label() {
        let json = r#"{"sections":{"section1":{"buttons":[{"label":"x"}]}}}"#;
        assert!(matches!(
            ProjectFile::from_json(json),
            Err(SoundboardError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_unknown_section_ignored() {
        let board = Soundboard::with_specs(&SectionSpec::defaults());
        let mut value = serde_json::to_value(ProjectFile::export(&board)).unwrap();
        value["sections"]["section9"] = serde_json::json!({ "anything": true });

        let project = ProjectFile::from_json(&value.to_string()).unwrap();
        assert!(!project.sections.contains_key("section9"));
        assert_eq!(project.to_sections().unwrap().len(), 4);
    }

    #[test]
    fn test_absent_section_skipped() {
        let json = r#"{"sections":{"section3":{"buttons":[]},"section1":{"buttons":[]}}}"#;
        let project = ProjectFile::from_json(json).unwrap();
        let sections = project.to_sections().unwrap();
        let ids: Vec<_> = sections.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![SectionId::Down, SectionId::Misc]);
    }

    #[test]
    fn test_partial_board_round_trip() {
        let mut board = Soundboard::with_specs(&[SectionSpec::new(SectionId::Down, 4, "Down")]);
        board
            .assign_clip(&SlotId::new("btn_section1_2"), "horn.mp3", "audio/mpeg", vec![9, 8, 7])
            .unwrap();
        let json = ProjectFile::export(&board).to_json().unwrap();

        let mut restored = Soundboard::with_specs(&SectionSpec::defaults());
        import(&mut restored, &ProjectFile::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored, board);
        assert!(restored.section(SectionId::Team).is_none());
    }

    #[test]
    fn test_duplicate_ids() {
        let board = Soundboard::with_specs(&SectionSpec::defaults());
        let mut project = ProjectFile::export(&board);
        let dup = project.sections["section1"].buttons[0].clone();
        project.sections.get_mut("section2").unwrap().buttons.push(dup);

        assert!(matches!(
            project.to_sections(),
            Err(SoundboardError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_bad_sound_data() {
        let board = Soundboard::with_specs(&SectionSpec::defaults());
        let mut project = ProjectFile::export(&board);
        project.sections.get_mut("section3").unwrap().buttons[5].sound_data =
            Some("https://example.com/horn.mp3".into());

        assert!(matches!(
            project.to_sections(),
            Err(SoundboardError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_capacity_rules() {
        let board = Soundboard::with_specs(&SectionSpec::defaults());
        let mut project = ProjectFile::export(&board);
        project.sections.get_mut("section1").unwrap().max_buttons = Some(2);
        project.sections.get_mut("section2").unwrap().max_buttons = None;
        project.sections.get_mut("section3").unwrap().max_buttons = Some(75);

        let sections = project.to_sections().unwrap();
        assert_eq!(sections[0].capacity(), 4);
        assert_eq!(sections[1].capacity(), 4);
        assert_eq!(sections[2].capacity(), 75);
        assert_eq!(sections[2].len(), 50);
    }

    #[test]
    fn test_stale_flags_import_idle() {
        let board = loaded_board();
        let mut project = ProjectFile::export(&board);
        let button = &mut project.sections.get_mut("section1").unwrap().buttons[0];
        button.is_playing = true;
        button.is_paused = true;

        let mut restored = Soundboard::new();
        import(&mut restored, &project).unwrap();
        assert!(restored.slots().all(|s| s.state() == SlotState::Idle));
    }

    #[test]
    fn test_failed_import_leaves_board() {
        let mut board = loaded_board();
        let before = board.clone();
        let mut project = ProjectFile::export(&Soundboard::with_specs(&SectionSpec::defaults()));
        project.sections.get_mut("section4").unwrap().buttons[0].sound_data =
            Some("not a data url".into());

        assert!(import(&mut board, &project).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_other_versions_accepted() {
        let board = Soundboard::with_specs(&SectionSpec::defaults());
        let mut value = serde_json::to_value(ProjectFile::export(&board)).unwrap();
        value["version"] = "1.0".into();
        value.as_object_mut().unwrap().remove("timestamp");

        let project = ProjectFile::from_json(&value.to_string()).unwrap();
        assert_eq!(project.version, "1.0");
        assert_eq!(project.timestamp, "");
        assert!(project.to_sections().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let board = loaded_board();

        ProjectFile::export(&board).save(&path).unwrap();
        let project = ProjectFile::load(&path).unwrap();
        let mut restored = Soundboard::new();
        import(&mut restored, &project).unwrap();
        assert_eq!(restored, board);
    }

    #[test]
    fn test_default_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            ProjectFile::default_file_name(date),
            "knights-soundboard-2026-03-07.json"
        );
    }
}
