// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Dominant color extraction for team logos.
//!
//! The logo is shrunk so its longer side is 100 px, every 10th pixel is
//! sampled, and exact RGB values are counted. Transparent (alpha < 128)
//! and near-black (r + g + b < 100) pixels are skipped.

use std::collections::HashMap;
use std::fmt;

use image::imageops::FilterType;
use tracing::debug;

use crate::error::{Result, SoundboardError};

/// Longest side of the image after shrinking
pub const SAMPLE_SIZE: u32 = 100;
/// Only every Nth pixel is counted
pub const PIXEL_STRIDE: usize = 10;
/// Number of colors a theme uses
pub const PALETTE_SIZE: usize = 3;

const MIN_ALPHA: u8 = 128;
const MIN_BRIGHTNESS: u32 = 100;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Create a color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Most frequent colors in raw RGBA pixel data.
///
/// Ranked by count, ties broken by which color was seen first.
pub fn dominant_colors(rgba: &[u8], limit: usize) -> Vec<Rgb> {
    let mut counts: HashMap<Rgb, usize> = HashMap::new();
    let mut order: Vec<Rgb> = Vec::new();

    for pixel in rgba.chunks_exact(4).step_by(PIXEL_STRIDE) {
        let (r, g, b, a) = (pixel[0], pixel[1], pixel[2], pixel[3]);
        if a < MIN_ALPHA || (r as u32 + g as u32 + b as u32) < MIN_BRIGHTNESS {
            continue;
        }

        let color = Rgb::new(r, g, b);
        let count = counts.entry(color).or_insert(0);
        if *count == 0 {
            order.push(color);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(limit);
    order
}

/// Decode an image and return up to three dominant colors
pub fn extract_palette(image_bytes: &[u8]) -> Result<Vec<Rgb>> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| SoundboardError::InvalidInput(format!("could not decode image: {}", e)))?;

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let ratio = f64::min(
        SAMPLE_SIZE as f64 / width as f64,
        SAMPLE_SIZE as f64 / height as f64,
    );
    let target_w = ((width as f64 * ratio) as u32).max(1);
    let target_h = ((height as f64 * ratio) as u32).max(1);

    let scaled = image::imageops::resize(&img.to_rgba8(), target_w, target_h, FilterType::Triangle);
    let colors = dominant_colors(scaled.as_raw(), PALETTE_SIZE);
    debug!(
        width,
        height,
        target_w,
        target_h,
        colors = colors.len(),
        "palette extracted"
    );
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixels(colors: &[(u8, u8, u8, u8)]) -> Vec<u8> {
        // Each listed color lands on a sampled pixel, with filler in between
        let mut out = Vec::new();
        for &(r, g, b, a) in colors {
            out.extend_from_slice(&[r, g, b, a]);
            for _ in 1..PIXEL_STRIDE {
                out.extend_from_slice(&[255, 255, 255, 0]);
            }
        }
        out
    }

    #[test]
    fn test_rank_by_frequency() {
        let data = pixels(&[
            (200, 0, 0, 255),
            (0, 200, 0, 255),
            (0, 200, 0, 255),
            (0, 0, 200, 255),
            (0, 200, 0, 255),
            (0, 0, 200, 255),
        ]);
        let colors = dominant_colors(&data, 3);
        assert_eq!(
            colors,
            vec![Rgb::new(0, 200, 0), Rgb::new(0, 0, 200), Rgb::new(200, 0, 0)]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let data = pixels(&[
            (10, 100, 100, 255),
            (100, 10, 100, 255),
            (100, 100, 10, 255),
        ]);
        let colors = dominant_colors(&data, 2);
        assert_eq!(colors, vec![Rgb::new(10, 100, 100), Rgb::new(100, 10, 100)]);
    }

    #[test]
    fn test_skips_transparent_and_dark() {
        let data = pixels(&[
            (255, 0, 0, 127),
            (30, 30, 30, 255),
            (40, 30, 30, 255),
            (50, 50, 50, 255),
        ]);
        let colors = dominant_colors(&data, 3);
        assert_eq!(colors, vec![Rgb::new(40, 30, 30), Rgb::new(50, 50, 50)]);
    }

    #[test]
    fn test_only_every_tenth_pixel_counts() {
        // Ten opaque red pixels: only the first is sampled
        let data: Vec<u8> = std::iter::repeat([255u8, 0, 0, 255])
            .take(10)
            .flatten()
            .collect();
        assert_eq!(dominant_colors(&data, 3), vec![Rgb::new(255, 0, 0)]);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::new(0x66, 0x7e, 0xea).to_hex(), "#667eea");
        assert_eq!(Rgb::new(0, 0, 0).to_string(), "#000000");
    }

    #[test]
    fn test_extract_palette_from_png() {
        let mut img = image::RgbaImage::new(40, 20);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = if x < 30 {
                image::Rgba([200, 40, 40, 255])
            } else {
                image::Rgba([40, 40, 200, 255])
            };
        }
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let colors = extract_palette(&bytes).unwrap();
        assert!(!colors.is_empty());
        assert!(colors.len() <= PALETTE_SIZE);
        assert_eq!(colors[0], Rgb::new(200, 40, 40));
    }

    #[test]
    fn test_extract_palette_rejects_garbage() {
        assert!(matches!(
            extract_palette(b"not an image").unwrap_err(),
            SoundboardError::InvalidInput(_)
        ));
    }
}
