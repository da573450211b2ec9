// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Input boundaries for user-supplied files.
//!
//! Audio uploads must declare an `audio/*` media type and logo images an
//! `image/*` one. When a file comes from disk its media type is derived
//! from the extension.

pub mod palette;

pub use palette::{dominant_colors, extract_palette, Rgb};

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SoundboardError};

/// Media type used when the extension is unknown
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

const MEDIA_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("webm", "audio/webm"),
    ("aif", "audio/aiff"),
    ("aiff", "audio/aiff"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
];

/// Lowercased extension of a file name, if it has one
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Media type for a file name, from its extension
pub fn media_type_for(filename: &str) -> &'static str {
    extension_of(filename)
        .and_then(|ext| {
            MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, media_type)| *media_type)
        })
        .unwrap_or(UNKNOWN_MEDIA_TYPE)
}

/// Reject anything that is not declared as audio
pub fn ensure_audio(media_type: &str) -> Result<()> {
    ensure_category(media_type, "audio/", "Please select an audio file")
}

/// Reject anything that is not declared as an image
pub fn ensure_image(media_type: &str) -> Result<()> {
    ensure_category(media_type, "image/", "Please select an image file")
}

fn ensure_category(media_type: &str, prefix: &str, message: &str) -> Result<()> {
    if media_type.to_ascii_lowercase().starts_with(prefix) {
        Ok(())
    } else {
        Err(SoundboardError::InvalidInput(format!(
            "{} (got {})",
            message, media_type
        )))
    }
}

/// A file read from disk together with its declared media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name without directories
    pub filename: String,
    /// Media type derived from the extension
    pub media_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read an audio file. Fails before reading if the type is not audio.
    pub fn audio<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(path.as_ref(), ensure_audio)
    }

    /// Read an image file. Fails before reading if the type is not an image.
    pub fn image<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(path.as_ref(), ensure_image)
    }

    fn read(path: &Path, check: fn(&str) -> Result<()>) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SoundboardError::InvalidInput(format!("not a file: {:?}", path)))?
            .to_string();
        let media_type = media_type_for(&filename);
        check(media_type)?;

        let bytes = fs::read(path)?;
        debug!(filename, media_type, size = bytes.len(), "upload read");
        Ok(Self {
            filename,
            media_type: media_type.to_string(),
            bytes,
        })
    }
}
