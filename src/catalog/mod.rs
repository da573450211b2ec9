// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Streaming music catalog capability.
//!
//! The catalog itself lives elsewhere (a platform music service); this
//! module defines the capability the soundboard needs from it, gates
//! searches behind authorization, and ships an in-memory catalog for
//! offline use and tests.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SoundboardError};

/// Authorization state of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationStatus {
    /// Access granted
    Authorized,
    /// User refused access
    Denied,
    /// User has not been asked yet
    NotDetermined,
    /// Access blocked by device policy
    Restricted,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthorizationStatus::Authorized => "authorized",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::NotDetermined => "not determined",
            AuthorizationStatus::Restricted => "restricted",
        };
        f.write_str(name)
    }
}

/// Track metadata returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Catalog identifier
    pub id: String,
    /// Track title
    pub title: String,
    /// Performing artist
    pub artist: String,
}

impl TrackInfo {
    /// Create track metadata
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// What the soundboard needs from a music catalog
pub trait MusicCatalog {
    /// Current authorization state, without prompting
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for access and return the resulting state
    fn request_authorization(&mut self) -> AuthorizationStatus;

    /// Search the catalog. Only called once authorized.
    fn search(&self, query: &str) -> Result<Vec<TrackInfo>>;
}

/// A catalog wrapper that refuses to search until authorized
pub struct CatalogSession<C: MusicCatalog> {
    catalog: C,
}

impl<C: MusicCatalog> CatalogSession<C> {
    /// Wrap a catalog
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Current authorization state
    pub fn status(&self) -> AuthorizationStatus {
        self.catalog.authorization_status()
    }

    /// Prompt for access if it has not been decided yet
    pub fn authorize(&mut self) -> AuthorizationStatus {
        let status = match self.catalog.authorization_status() {
            AuthorizationStatus::NotDetermined => self.catalog.request_authorization(),
            status => status,
        };
        info!(%status, "catalog authorization");
        status
    }

    /// Search by free text
    pub fn search(&self, query: &str) -> Result<Vec<TrackInfo>> {
        match self.catalog.authorization_status() {
            AuthorizationStatus::Authorized => {
                let tracks = self.catalog.search(query)?;
                debug!(query, results = tracks.len(), "catalog search");
                Ok(tracks)
            }
            status => {
                warn!(%status, "catalog search refused");
                Err(SoundboardError::Authorization(status))
            }
        }
    }

    /// Run the search behind a preset button
    pub fn search_preset(&self, preset: &PresetButton) -> Result<Vec<TrackInfo>> {
        self.search(preset.search_query)
    }

    /// Unwrap the catalog
    pub fn into_inner(self) -> C {
        self.catalog
    }
}

/// A catalog held in memory
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    tracks: Vec<TrackInfo>,
    status: AuthorizationStatus,
    /// Status granted when authorization is requested
    grant: AuthorizationStatus,
}

impl InMemoryCatalog {
    /// Create a catalog that grants access when asked
    pub fn new(tracks: Vec<TrackInfo>) -> Self {
        Self {
            tracks,
            status: AuthorizationStatus::NotDetermined,
            grant: AuthorizationStatus::Authorized,
        }
    }

    /// Set the status returned when authorization is requested
    pub fn with_grant(mut self, grant: AuthorizationStatus) -> Self {
        self.grant = grant;
        self
    }

    /// Load a JSON array of tracks
    pub fn load<P: AsRef<Path>>(path: P) -> AnyResult<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read track library: {:?}", path.as_ref()))?;
        let tracks: Vec<TrackInfo> =
            serde_json::from_str(&contents).context("Failed to parse track library")?;
        Ok(Self::new(tracks))
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the catalog has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl MusicCatalog for InMemoryCatalog {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.status
    }

    fn request_authorization(&mut self) -> AuthorizationStatus {
        self.status = self.grant;
        self.status
    }

    fn search(&self, query: &str) -> Result<Vec<TrackInfo>> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // A track matches when any query word appears in its title or artist
        Ok(self
            .tracks
            .iter()
            .filter(|track| {
                let haystack = format!("{} {}", track.title, track.artist).to_lowercase();
                terms.iter().any(|term| haystack.contains(term.as_str()))
            })
            .cloned()
            .collect())
    }
}

/// A soundboard button that plays the first catalog hit for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetButton {
    /// Button title
    pub title: &'static str,
    /// Emoji shown on the button
    pub emoji: &'static str,
    /// Catalog query
    pub search_query: &'static str,
}

/// The catalog-backed buttons of the mobile board
pub const PRESET_BUTTONS: [PresetButton; 8] = [
    PresetButton { title: "Victory", emoji: "🏆", search_query: "victory music" },
    PresetButton { title: "Epic", emoji: "⚔️", search_query: "epic battle music" },
    PresetButton { title: "Dramatic", emoji: "🎭", search_query: "dramatic orchestral" },
    PresetButton { title: "Medieval", emoji: "🏰", search_query: "medieval fantasy music" },
    PresetButton { title: "Adventure", emoji: "🗡️", search_query: "adventure theme" },
    PresetButton { title: "Mystical", emoji: "✨", search_query: "mystical magical music" },
    PresetButton { title: "Battle", emoji: "⚔️", search_query: "battle theme music" },
    PresetButton { title: "Triumph", emoji: "👑", search_query: "triumphant music" },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            TrackInfo::new("1", "Victory Lap", "Brass Band"),
            TrackInfo::new("2", "Quiet Evening", "Piano Trio"),
            TrackInfo::new("3", "Battle Hymn", "Victory Choir"),
        ])
    }

    #[test]
    fn test_search_requires_authorization() {
        let session = CatalogSession::new(catalog());
        let err = session.search("victory").unwrap_err();
        assert!(matches!(
            err,
            SoundboardError::Authorization(AuthorizationStatus::NotDetermined)
        ));
    }

    #[test]
    fn test_search_after_authorization() {
        let mut session = CatalogSession::new(catalog());
        assert_eq!(session.authorize(), AuthorizationStatus::Authorized);

        let hits = session.search("VICTORY").unwrap();
        let ids: Vec<&str> = hits.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_denied_authorization() {
        let mut session =
            CatalogSession::new(catalog().with_grant(AuthorizationStatus::Denied));
        assert_eq!(session.authorize(), AuthorizationStatus::Denied);
        // Once decided, asking again does not prompt
        assert_eq!(session.authorize(), AuthorizationStatus::Denied);
        assert!(session.search("battle").is_err());
    }

    #[test]
    fn test_blank_query() {
        let mut session = CatalogSession::new(catalog());
        session.authorize();
        assert!(session.search("   ").unwrap().is_empty());
    }

    #[test]
    fn test_search_preset() {
        let mut session = CatalogSession::new(catalog());
        session.authorize();
        let battle = PRESET_BUTTONS.iter().find(|p| p.title == "Battle").unwrap();
        let hits = session.search_preset(battle).unwrap();
        assert!(hits.iter().any(|t| t.title == "Battle Hymn"));
    }

    #[test]
    fn test_load_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(
            &path,
            r#"[{"id": "a", "title": "Epic Intro", "artist": "Orchestra"}]"#,
        )
        .unwrap();

        let catalog = InMemoryCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AuthorizationStatus::NotDetermined.to_string(), "not determined");
        assert_eq!(AuthorizationStatus::Restricted.to_string(), "restricted");
    }
}
