// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the soundboard core.

use thiserror::Error;

use crate::catalog::AuthorizationStatus;

/// Errors surfaced by soundboard operations.
///
/// Every variant is recoverable: callers report it to the user and keep
/// the previous state.
#[derive(Debug, Error)]
pub enum SoundboardError {
    /// Unknown slot or section identifier
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up ("slot", "section")
        kind: &'static str,
        /// The identifier that did not resolve
        id: String,
    },

    /// Input file has the wrong media type
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Malformed project document
    #[error("invalid project file: {0}")]
    InvalidFormat(String),

    /// Device acquisition or playback failure
    #[error("playback error: {0}")]
    Playback(String),

    /// Music catalog access is not authorized
    #[error("music catalog access not authorized (status: {0})")]
    Authorization(AuthorizationStatus),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SoundboardError {
    /// Unknown slot identifier
    pub fn slot_not_found(id: impl Into<String>) -> Self {
        SoundboardError::NotFound {
            kind: "slot",
            id: id.into(),
        }
    }

    /// Unknown section identifier
    pub fn section_not_found(id: impl Into<String>) -> Self {
        SoundboardError::NotFound {
            kind: "section",
            id: id.into(),
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, SoundboardError>;
