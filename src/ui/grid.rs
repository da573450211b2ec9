// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Section panel widget: one cell per slot, laid out in rows.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::board::{Section, Slot, SlotState};

/// Width of one slot cell in columns
pub const CELL_WIDTH: u16 = 18;

/// Number of cells that fit in `width`
pub fn columns_for(width: u16) -> usize {
    (width / CELL_WIDTH).max(1) as usize
}

/// State glyph shown before a slot's label
pub fn slot_glyph(slot: &Slot) -> &'static str {
    match slot.state() {
        SlotState::Playing => "▶",
        SlotState::Paused => "⏸",
        SlotState::Idle if slot.is_loaded() => "♪",
        SlotState::Idle => "·",
    }
}

/// Grid of a section's slots
pub struct SectionWidget<'a> {
    section: &'a Section,
    selected: Option<usize>,
    accent: Color,
    block: Option<Block<'a>>,
}

impl<'a> SectionWidget<'a> {
    /// Create a widget for a section
    pub fn new(section: &'a Section) -> Self {
        Self {
            section,
            selected: None,
            accent: Color::Green,
            block: None,
        }
    }

    /// Highlight the slot at `index`
    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    /// Color for playing slots
    pub fn accent(mut self, color: Color) -> Self {
        self.accent = color;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn cell(&self, index: usize, slot: &'a Slot) -> Span<'a> {
        let width = CELL_WIDTH as usize - 1;
        let text = format!("{} {}", slot_glyph(slot), slot.label());
        let text: String = if text.chars().count() > width {
            let mut cut: String = text.chars().take(width - 1).collect();
            cut.push('…');
            cut
        } else {
            format!("{:<width$}", text, width = width)
        };

        let mut style = match slot.state() {
            SlotState::Playing => Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
            SlotState::Paused => Style::default().fg(Color::Yellow),
            SlotState::Idle if slot.is_loaded() => Style::default().fg(Color::White),
            SlotState::Idle => Style::default().fg(Color::DarkGray),
        };
        if self.selected == Some(index) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Span::styled(text, style)
    }
}

impl Widget for SectionWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block.clone() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        if area.height == 0 || area.width == 0 {
            return;
        }

        let columns = columns_for(area.width);
        let visible_rows = area.height as usize;
        let selected_row = self.selected.map(|i| i / columns).unwrap_or(0);
        // Scroll so the selected row stays on screen
        let first_row = selected_row.saturating_sub(visible_rows - 1);

        let lines: Vec<Line> = self
            .section
            .slots()
            .chunks(columns)
            .enumerate()
            .skip(first_row)
            .take(visible_rows)
            .map(|(row, slots)| {
                let spans: Vec<Span> = slots
                    .iter()
                    .enumerate()
                    .flat_map(|(col, slot)| {
                        [self.cell(row * columns + col, slot), Span::raw(" ")]
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(area, buf);
    }
}
