// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application configuration.
//!
//! Settings live in an optional YAML file. Every field has a default, so
//! an empty file (or none at all) gives a working setup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::playback::DEFAULT_VOLUME;
use crate::theme::TeamColors;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Audio output settings
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Initial team colors
    #[serde(default)]
    pub theme: TeamColors,
    /// Terminal UI settings
    #[serde(default)]
    pub ui: UiConfig,
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Where logs go while the terminal UI is running
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            theme: TeamColors::default(),
            ui: UiConfig::default(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Load the file if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.playback.volume) {
            anyhow::bail!(
                "playback.volume must be between 0.0 and 1.0, got {}",
                self.playback.volume
            );
        }
        if self.ui.frame_rate == 0 {
            anyhow::bail!("ui.frame_rate must be at least 1");
        }
        for (name, value) in [
            ("primary", &self.theme.primary),
            ("secondary", &self.theme.secondary),
            ("accent", &self.theme.accent),
        ] {
            if TeamColors::parse_hex(value).is_none() {
                anyhow::bail!("theme.{} must be a #rrggbb color, got {:?}", name, value);
            }
        }
        Ok(())
    }
}

/// Which playback device to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// System audio output
    #[default]
    Cpal,
    /// No sound, wall-clock timing only
    Silent,
}

/// Audio output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Gain for every clip (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Output backend
    #[serde(default)]
    pub backend: Backend,
}

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            backend: Backend::default(),
        }
    }
}

/// Terminal UI settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Redraws per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// How long status messages stay visible
    #[serde(default = "default_status_seconds")]
    pub status_seconds: u64,
}

fn default_frame_rate() -> u32 {
    30
}
fn default_status_seconds() -> u64 {
    3
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            status_seconds: default_status_seconds(),
        }
    }
}
