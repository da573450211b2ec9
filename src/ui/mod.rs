// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the soundboard.
//!
//! Provides a ratatui-based terminal interface with one panel per section,
//! a now-playing bar, and a status line for transient messages, prompts
//! and confirmations.

mod grid;
mod now_playing;

pub use grid::{columns_for, slot_glyph, SectionWidget, CELL_WIDTH};
pub use now_playing::NowPlayingWidget;

use std::collections::BTreeMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::board::{SectionId, SlotId, Soundboard};
use crate::config::UiConfig;
use crate::media::Rgb;
use crate::playback::{Completion, Transition};
use crate::project::ProjectFile;
use crate::session::Session;
use crate::theme::TeamColors;

/// Volume change per key press
const VOLUME_STEP: f32 = 0.1;

/// What a text prompt is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Audio file for the selected slot
    Upload,
    /// Where to save the project
    Save,
    /// Project file to open
    Load,
    /// Logo image for the theme
    Logo,
}

impl PromptKind {
    fn title(&self) -> &'static str {
        match self {
            PromptKind::Upload => "Audio file",
            PromptKind::Save => "Save project as",
            PromptKind::Load => "Open project",
            PromptKind::Logo => "Team logo",
        }
    }
}

/// A destructive operation awaiting y/n
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmKind {
    /// Remove the clip from a slot
    DeleteClip(SlotId),
    /// Clear the whole board
    ResetAll,
}

/// Keyboard input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys are commands
    #[default]
    Normal,
    /// Keys edit a line of text
    Prompt {
        /// What the text is for
        kind: PromptKind,
        /// Text typed so far
        buffer: String,
    },
    /// Waiting for y/n
    Confirm(ConfirmKind),
}

/// Selected slot position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Section holding the selection
    pub section: SectionId,
    /// Slot index within the section
    pub index: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            section: SectionId::Down,
            index: 0,
        }
    }
}

/// UI state between frames
#[derive(Debug, Clone)]
pub struct UiState {
    /// Selected slot
    pub cursor: Cursor,
    /// Input mode
    pub mode: InputMode,
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
    /// How long a status message stays
    pub status_ttl: Duration,
    /// Cells per row for each section at the last draw
    pub columns: BTreeMap<SectionId, usize>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: Cursor::default(),
            mode: InputMode::Normal,
            show_help: false,
            status_message: None,
            status_time: None,
            status_ttl: Duration::from_secs(3),
            columns: BTreeMap::new(),
        }
    }
}

impl UiState {
    /// Create state with the configured status lifetime
    pub fn new(config: &UiConfig) -> Self {
        Self {
            status_ttl: Duration::from_secs(config.status_seconds),
            ..Default::default()
        }
    }

    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > self.status_ttl {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Id of the selected slot
    pub fn selected_slot(&self, board: &Soundboard) -> Option<SlotId> {
        board
            .slot_at(self.cursor.section, self.cursor.index)
            .map(|slot| slot.id().clone())
    }

    /// Keep the cursor inside its section after the board changed
    pub fn clamp(&mut self, board: &Soundboard) {
        let len = section_len(board, self.cursor.section);
        self.cursor.index = self.cursor.index.min(len.saturating_sub(1));
    }

    fn columns_of(&self, section: SectionId) -> usize {
        self.columns.get(&section).copied().unwrap_or(1).max(1)
    }

    fn move_by(&mut self, board: &Soundboard, delta: isize) {
        let len = section_len(board, self.cursor.section);
        let target = self.cursor.index as isize + delta;
        if target >= 0 && (target as usize) < len {
            self.cursor.index = target as usize;
        }
    }

    fn cycle_section(&mut self, board: &Soundboard, forward: bool) {
        let all = SectionId::ALL;
        let pos = all
            .iter()
            .position(|s| *s == self.cursor.section)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % all.len()
        } else {
            (pos + all.len() - 1) % all.len()
        };
        self.cursor.section = all[next];
        self.clamp(board);
    }

    /// Map a key press to an action, updating navigation and input mode
    pub fn handle_key(
        &mut self,
        board: &Soundboard,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> KeyAction {
        if let InputMode::Prompt { kind, buffer } = &mut self.mode {
            let action = match code {
                KeyCode::Enter => KeyAction::Submit(*kind, buffer.trim().to_string()),
                KeyCode::Esc => KeyAction::Cancel,
                KeyCode::Backspace => {
                    buffer.pop();
                    return KeyAction::None;
                }
                KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                    buffer.push(c);
                    return KeyAction::None;
                }
                _ => return KeyAction::None,
            };
            self.mode = InputMode::Normal;
            return action;
        }

        if let InputMode::Confirm(kind) = &self.mode {
            let action = match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Confirm(kind.clone()),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => KeyAction::Cancel,
                _ => return KeyAction::None,
            };
            self.mode = InputMode::Normal;
            return action;
        }

        match (code, modifiers) {
            // Quit
            (KeyCode::Char('q'), KeyModifiers::NONE)
            | (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,

            // Navigation
            (KeyCode::Left, _) => {
                self.move_by(board, -1);
                KeyAction::None
            }
            (KeyCode::Right, _) => {
                self.move_by(board, 1);
                KeyAction::None
            }
            (KeyCode::Up, _) => {
                let step = self.columns_of(self.cursor.section) as isize;
                self.move_by(board, -step);
                KeyAction::None
            }
            (KeyCode::Down, _) => {
                let step = self.columns_of(self.cursor.section) as isize;
                self.move_by(board, step);
                KeyAction::None
            }
            (KeyCode::Tab, _) => {
                self.cycle_section(board, true);
                KeyAction::None
            }
            (KeyCode::BackTab, _) => {
                self.cycle_section(board, false);
                KeyAction::None
            }

            // Playback
            (KeyCode::Enter, _) => match self.selected_slot(board) {
                Some(slot) => KeyAction::Toggle(slot),
                None => KeyAction::None,
            },
            (KeyCode::Char(' '), _) => KeyAction::ToggleCurrent,
            (KeyCode::Esc, _) | (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::Stop,
            (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => KeyAction::VolumeUp,
            (KeyCode::Char('-'), _) => KeyAction::VolumeDown,

            // Files
            (KeyCode::Char('u'), KeyModifiers::NONE) => self.prompt(PromptKind::Upload, ""),
            (KeyCode::Char('o'), KeyModifiers::NONE) => self.prompt(PromptKind::Load, ""),
            (KeyCode::Char('l'), KeyModifiers::NONE) => self.prompt(PromptKind::Logo, ""),
            (KeyCode::Char('w'), KeyModifiers::NONE) => {
                let name = ProjectFile::default_file_name(Local::now().date_naive());
                self.prompt(PromptKind::Save, &name)
            }

            // Destructive
            (KeyCode::Char('d'), KeyModifiers::NONE) => {
                match board.slot_at(self.cursor.section, self.cursor.index) {
                    Some(slot) if slot.is_loaded() => {
                        self.mode = InputMode::Confirm(ConfirmKind::DeleteClip(slot.id().clone()));
                    }
                    _ => self.set_status("Slot is empty"),
                }
                KeyAction::None
            }
            (KeyCode::Char('R'), _) => {
                self.mode = InputMode::Confirm(ConfirmKind::ResetAll);
                KeyAction::None
            }

            // Help
            (KeyCode::Char('?'), _) | (KeyCode::Char('h'), KeyModifiers::NONE) => {
                self.show_help = !self.show_help;
                KeyAction::ToggleHelp
            }

            _ => KeyAction::None,
        }
    }

    fn prompt(&mut self, kind: PromptKind, initial: &str) -> KeyAction {
        self.mode = InputMode::Prompt {
            kind,
            buffer: initial.to_string(),
        };
        KeyAction::None
    }
}

fn section_len(board: &Soundboard, section: SectionId) -> usize {
    board.section(section).map(|s| s.len()).unwrap_or(0)
}

/// Key event result
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Quit the application
    Quit,
    /// Play, pause or resume a slot
    Toggle(SlotId),
    /// Pause or resume whatever is active
    ToggleCurrent,
    /// Stop playback
    Stop,
    /// Raise volume
    VolumeUp,
    /// Lower volume
    VolumeDown,
    /// Prompt answered
    Submit(PromptKind, String),
    /// Destructive operation confirmed
    Confirm(ConfirmKind),
    /// Prompt or confirmation dismissed
    Cancel,
    /// Toggle help
    ToggleHelp,
}

/// Carry out an action against the session, reporting through the status line
pub fn apply_action(session: &mut Session, state: &mut UiState, action: KeyAction) {
    match action {
        KeyAction::Toggle(slot) => match session.toggle(&slot) {
            Ok(Transition::Ignored) => state.set_status("Slot is empty"),
            Ok(transition) => debug!(slot = %slot, ?transition, "toggled"),
            Err(e) => state.set_status(format!("Error: {}", e)),
        },
        KeyAction::ToggleCurrent => match session.toggle_current() {
            Ok(Transition::Ignored) => state.set_status("Nothing is playing"),
            Ok(_) => {}
            Err(e) => state.set_status(format!("Error: {}", e)),
        },
        KeyAction::Stop => {
            if session.stop().is_some() {
                state.set_status("Stopped");
            }
        }
        KeyAction::VolumeUp | KeyAction::VolumeDown => {
            let step = if action == KeyAction::VolumeUp {
                VOLUME_STEP
            } else {
                -VOLUME_STEP
            };
            session.set_volume(session.volume() + step);
            state.set_status(format!("Volume {}%", (session.volume() * 100.0).round()));
        }
        KeyAction::Submit(_, ref text) if text.is_empty() => state.set_status("Cancelled"),
        KeyAction::Submit(kind, text) => submit(session, state, kind, &text),
        KeyAction::Confirm(ConfirmKind::DeleteClip(slot)) => match session.delete_clip(&slot) {
            Ok(slot) => state.set_status(format!("Cleared {}", slot.label())),
            Err(e) => state.set_status(format!("Error: {}", e)),
        },
        KeyAction::Confirm(ConfirmKind::ResetAll) => {
            session.reset_all();
            state.clamp(session.board());
            state.set_status("Board reset");
        }
        KeyAction::Cancel => state.set_status("Cancelled"),
        KeyAction::None | KeyAction::Quit | KeyAction::ToggleHelp => {}
    }
}

fn submit(session: &mut Session, state: &mut UiState, kind: PromptKind, path: &str) {
    let result = match kind {
        PromptKind::Upload => match state.selected_slot(session.board()) {
            Some(slot) => session
                .upload_clip(&slot, path)
                .map(|slot| format!("Loaded {}", slot.label())),
            None => Ok("No slot selected".to_string()),
        },
        PromptKind::Save => session
            .save_project(path)
            .map(|_| format!("Saved {}", path)),
        PromptKind::Load => session.load_project(path).map(|_| {
            state.clamp(session.board());
            format!("Loaded {}", path)
        }),
        PromptKind::Logo => session.apply_logo(path).map(|palette| {
            let colors: Vec<String> = palette.iter().map(Rgb::to_hex).collect();
            format!("Theme updated: {}", colors.join(" "))
        }),
    };

    match result {
        Ok(message) => state.set_status(message),
        Err(e) => {
            warn!(?kind, path, error = %e, "file operation failed");
            state.set_status(format!("Error: {}", e));
        }
    }
}

/// Turn a finished sound into a status message
pub fn report_completion(session: &mut Session, state: &mut UiState) {
    if let Some((slot, completion)) = session.poll() {
        let label = session
            .board()
            .find_slot(&slot)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|_| slot.to_string());
        match completion {
            Completion::Ended => state.set_status(format!("Finished {}", label)),
            Completion::Error(msg) => state.set_status(format!("Playback error in {}: {}", label, msg)),
        }
    }
}

/// Terminal UI application
pub struct App {
    /// UI state
    state: UiState,
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
}

impl App {
    /// Set up the terminal
    pub fn new(config: &UiConfig) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let mut app = Self {
            state: UiState::new(config),
            terminal,
            frame_rate: 30,
            running: true,
        };
        app.set_frame_rate(config.frame_rate);
        Ok(app)
    }

    /// UI state
    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Set frame rate
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(1, 120);
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Handle a key event
    pub fn handle_key(&mut self, board: &Soundboard, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        let action = self.state.handle_key(board, code, modifiers);
        if action == KeyAction::Quit {
            self.quit();
        }
        action
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Main loop: draw, read keys, apply them, until quit
    pub fn run(&mut self, session: &mut Session) -> io::Result<()> {
        while self.running {
            report_completion(session, &mut self.state);
            self.state.clear_expired_status();
            self.draw(session)?;

            if let Some(Event::Key(key)) = self.poll_event()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = self.handle_key(session.board(), key.code, key.modifiers);
                apply_action(session, &mut self.state, action);
            }
        }
        session.stop();
        Ok(())
    }

    /// Draw the UI
    pub fn draw(&mut self, session: &Session) -> io::Result<()> {
        let state = &self.state;
        let mut columns = BTreeMap::new();

        self.terminal.draw(|frame| {
            let area = frame.area();
            let palette = Palette::from_theme(session.theme());

            // Main layout: header, sections, now playing, status
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Length(3), // Down / Team
                    Constraint::Fill(1),   // Misc
                    Constraint::Fill(1),   // Player
                    Constraint::Length(3), // Now playing
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            render_header(frame, chunks[0], session, &palette);

            let top = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);
            let panels = [
                (SectionId::Down, top[0]),
                (SectionId::Team, top[1]),
                (SectionId::Misc, chunks[2]),
                (SectionId::Player, chunks[3]),
            ];
            for (id, panel) in panels {
                let block = section_block(session.board(), id, state.cursor.section == id, &palette);
                columns.insert(id, columns_for(block.inner(panel).width));
                if let Some(section) = session.board().section(id) {
                    let selected = (state.cursor.section == id).then_some(state.cursor.index);
                    frame.render_widget(
                        SectionWidget::new(section)
                            .selected(selected)
                            .accent(palette.accent)
                            .block(block),
                        panel,
                    );
                }
            }

            frame.render_widget(
                NowPlayingWidget::new(session.active(), session.volume())
                    .accent(palette.accent)
                    .block(Block::default().borders(Borders::ALL).title(" Now Playing ")),
                chunks[4],
            );

            render_status_bar(frame, chunks[5], state);

            if state.show_help {
                render_help_overlay(frame, area);
            }
        })?;

        self.state.columns = columns;
        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Team colors as terminal colors
struct Palette {
    primary: Color,
    secondary: Color,
    accent: Color,
}

impl Palette {
    fn from_theme(theme: &TeamColors) -> Self {
        let convert = |rgb: Option<Rgb>, fallback: Color| {
            rgb.map(|c| Color::Rgb(c.r, c.g, c.b)).unwrap_or(fallback)
        };
        Self {
            primary: convert(theme.primary_rgb(), Color::Blue),
            secondary: convert(theme.secondary_rgb(), Color::Magenta),
            accent: convert(theme.accent_rgb(), Color::Green),
        }
    }
}

fn section_block<'a>(board: &Soundboard, id: SectionId, focused: bool, palette: &Palette) -> Block<'a> {
    let (loaded, len) = board
        .section(id)
        .map(|s| (s.loaded_count(), s.len()))
        .unwrap_or((0, 0));
    let border = if focused { palette.primary } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {} {}/{} ", id.title(), loaded, len))
}

/// Render header
fn render_header(frame: &mut Frame, area: Rect, session: &Session, palette: &Palette) {
    let board = session.board();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.secondary));
    let line = Line::from(vec![
        Span::styled(
            " KNIGHTS SOUNDBOARD ",
            Style::default().fg(palette.primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} of {} slots loaded ", board.loaded_count(), board.slot_count()),
            Style::default().fg(Color::Gray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = match &state.mode {
        InputMode::Prompt { kind, buffer } => Span::styled(
            format!(" {}: {}█  (Enter: OK, Esc: cancel)", kind.title(), buffer),
            Style::default().fg(Color::Cyan),
        ),
        InputMode::Confirm(ConfirmKind::DeleteClip(slot)) => Span::styled(
            format!(" Delete the clip in {}? (y/n)", slot),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        InputMode::Confirm(ConfirmKind::ResetAll) => Span::styled(
            " Reset the whole board? Every clip will be removed. (y/n)",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        InputMode::Normal => match state.status_message {
            Some(ref msg) => Span::styled(format!(" {}", msg), Style::default().fg(Color::Yellow)),
            None => Span::styled(
                " Enter: Play/Pause | Space: Current | Esc: Stop | u: Upload | d: Delete | h: Help | q: Quit",
                Style::default().fg(Color::DarkGray),
            ),
        },
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    // Calculate centered area
    let width = 50.min(area.width.saturating_sub(4));
    let height = 22.min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Playback", bold)),
        Line::from("  Enter       Play/Pause selected slot"),
        Line::from("  Space       Pause/Resume current sound"),
        Line::from("  Esc/s       Stop"),
        Line::from("  +/-         Volume"),
        Line::from(""),
        Line::from(Span::styled("Navigation", bold)),
        Line::from("  Arrows      Move selection"),
        Line::from("  Tab         Next section"),
        Line::from(""),
        Line::from(Span::styled("Clips & Files", bold)),
        Line::from("  u           Upload audio to slot"),
        Line::from("  d           Delete clip from slot"),
        Line::from("  w / o       Save / open project"),
        Line::from("  l           Team logo colors"),
        Line::from("  R           Reset board"),
        Line::from(""),
        Line::from(Span::styled("Other", bold)),
        Line::from("  h/?         Toggle help"),
        Line::from("  q/Ctrl+c    Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
