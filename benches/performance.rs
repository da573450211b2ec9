// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for the soundboard
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Logo palette extraction
//! - Project export and import with embedded audio
//! - Button toggling on a full board

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgba, RgbaImage};

use soundboard::media::{dominant_colors, extract_palette};
use soundboard::{
    Clip, Completion, PlaybackDevice, PlaybackHandle, ProjectFile, Result, Session, SlotId,
    Soundboard,
};

/// Device whose handles do nothing
struct NullDevice;

struct NullHandle;

impl PlaybackDevice for NullDevice {
    fn open(&mut self, _clip: &Clip) -> Result<Box<dyn PlaybackHandle>> {
        Ok(Box::new(NullHandle))
    }
}

impl PlaybackHandle for NullHandle {
    fn play(&mut self) -> Result<()> {
        Ok(())
    }
    fn pause(&mut self) {}
    fn stop(&mut self) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn poll_completion(&mut self) -> Option<Completion> {
        None
    }
}

fn logo(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if (x / 16 + y / 16) % 2 == 0 {
            Rgba([0, 51, 160, 255])
        } else {
            Rgba([255, 199, 44, 255])
        }
    });
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

/// Benchmark palette extraction (logo upload)
fn bench_palette(c: &mut Criterion) {
    let mut group = c.benchmark_group("palette");

    let rgba: Vec<u8> = (0..100 * 100)
        .flat_map(|i| [(i % 7 * 30) as u8, (i % 5 * 40) as u8, 90, 255])
        .collect();
    group.bench_function("dominant_colors", |b| {
        b.iter(|| black_box(dominant_colors(black_box(&rgba), 3)))
    });

    for side in [64u32, 512, 2048] {
        let png = logo(side, side);
        group.bench_with_input(BenchmarkId::new("extract", side), &png, |b, png| {
            b.iter(|| black_box(extract_palette(png).expect("palette")))
        });
    }

    group.finish();
}

/// Board with `loaded` clips of `clip_size` bytes each
fn loaded_board(loaded: usize, clip_size: usize) -> Soundboard {
    let mut board = Soundboard::new();
    let ids: Vec<SlotId> = board.slots().take(loaded).map(|s| s.id().clone()).collect();
    for (i, id) in ids.iter().enumerate() {
        board
            .assign_clip(id, &format!("clip{}.mp3", i), "audio/mpeg", vec![i as u8; clip_size])
            .expect("assign");
    }
    board
}

/// Benchmark project export and import
fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");
    group.sample_size(20);

    for loaded in [0usize, 20, 118] {
        let board = loaded_board(loaded, 64 * 1024);
        let json = ProjectFile::export(&board).to_json().expect("json");

        group.bench_with_input(BenchmarkId::new("export", loaded), &board, |b, board| {
            b.iter(|| black_box(ProjectFile::export(board).to_json().expect("json")))
        });

        group.bench_with_input(BenchmarkId::new("import", loaded), &json, |b, json| {
            b.iter(|| {
                let project = ProjectFile::from_json(json).expect("parse");
                black_box(project.to_sections().expect("sections"))
            })
        });
    }

    group.finish();
}

/// Benchmark toggling across the whole board
fn bench_toggle(c: &mut Criterion) {
    let mut session = Session::new(Box::new(NullDevice));
    let ids: Vec<SlotId> = session.board().slots().map(|s| s.id().clone()).collect();
    for id in &ids {
        session
            .assign_clip(id, "clip.mp3", "audio/mpeg", vec![0; 16])
            .expect("assign");
    }

    c.bench_function("toggle_every_slot", |b| {
        b.iter(|| {
            for id in &ids {
                black_box(session.toggle(id).expect("toggle"));
            }
            session.stop();
        })
    });
}

criterion_group!(benches, bench_palette, bench_project, bench_toggle);
criterion_main!(benches);
