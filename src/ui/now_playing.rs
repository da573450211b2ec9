// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Floating control: what is playing and how loud.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};

use crate::board::{Slot, SlotState};

/// Now-playing bar
pub struct NowPlayingWidget<'a> {
    slot: Option<&'a Slot>,
    volume: f32,
    accent: Color,
    block: Option<Block<'a>>,
}

impl<'a> NowPlayingWidget<'a> {
    /// Create a bar for the active slot, if any
    pub fn new(slot: Option<&'a Slot>, volume: f32) -> Self {
        Self {
            slot,
            volume,
            accent: Color::Green,
            block: None,
        }
    }

    /// Color for the playing indicator
    pub fn accent(mut self, color: Color) -> Self {
        self.accent = color;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for NowPlayingWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12), // State
                Constraint::Min(10),    // Label
                Constraint::Length(24), // Volume
            ])
            .split(area);

        let (indicator, style) = match self.slot.map(|s| s.state()) {
            Some(SlotState::Playing) => (
                "▶ PLAYING",
                Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
            ),
            Some(SlotState::Paused) => ("⏸ PAUSED", Style::default().fg(Color::Yellow)),
            _ => ("■ IDLE", Style::default().fg(Color::DarkGray)),
        };
        Paragraph::new(indicator).style(style).render(chunks[0], buf);

        let label = match self.slot {
            Some(slot) => slot
                .clip()
                .map(|c| format!("{} ({})", slot.label(), c.filename()))
                .unwrap_or_else(|| slot.label().to_string()),
            None => "Nothing playing".to_string(),
        };
        Paragraph::new(label)
            .style(Style::default().fg(Color::White))
            .render(chunks[1], buf);

        // Volume meter
        let meter_width = chunks[2].width.saturating_sub(6) as usize;
        let filled = ((self.volume.clamp(0.0, 1.0) * meter_width as f32).round() as usize)
            .min(meter_width);
        let meter = format!(
            "{:>3}% {}{}",
            (self.volume * 100.0).round() as u32,
            "█".repeat(filled),
            "░".repeat(meter_width - filled)
        );
        Paragraph::new(meter)
            .style(Style::default().fg(Color::Cyan))
            .render(chunks[2], buf);
    }
}
