// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Team colors.
//!
//! The board is tinted with three colors. Uploading a team logo replaces
//! them with the logo's dominant colors.

use serde::{Deserialize, Serialize};

use crate::media::Rgb;

/// Primary, secondary and accent colors as `#rrggbb` strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamColors {
    /// Main tint
    #[serde(default = "default_primary")]
    pub primary: String,
    /// Second tint
    #[serde(default = "default_secondary")]
    pub secondary: String,
    /// Highlight color
    #[serde(default = "default_accent")]
    pub accent: String,
}

fn default_primary() -> String {
    "#667eea".to_string()
}
fn default_secondary() -> String {
    "#764ba2".to_string()
}
fn default_accent() -> String {
    "#4CAF50".to_string()
}

impl Default for TeamColors {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            accent: default_accent(),
        }
    }
}

impl TeamColors {
    /// Overwrite colors in order with the palette. Missing entries keep
    /// their current value.
    pub fn apply_palette(&mut self, palette: &[Rgb]) {
        let targets = [&mut self.primary, &mut self.secondary, &mut self.accent];
        for (target, color) in targets.into_iter().zip(palette) {
            *target = color.to_hex();
        }
    }

    /// Parse a `#rrggbb` string into components
    pub fn parse_hex(hex: &str) -> Option<Rgb> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Primary color as RGB, if well formed
    pub fn primary_rgb(&self) -> Option<Rgb> {
        Self::parse_hex(&self.primary)
    }

    /// Secondary color as RGB, if well formed
    pub fn secondary_rgb(&self) -> Option<Rgb> {
        Self::parse_hex(&self.secondary)
    }

    /// Accent color as RGB, if well formed
    pub fn accent_rgb(&self) -> Option<Rgb> {
        Self::parse_hex(&self.accent)
    }
}
