// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use soundboard::catalog::{CatalogSession, InMemoryCatalog, PRESET_BUTTONS};
use soundboard::config::{AppConfig, Backend};
use soundboard::media::{self, Upload};
use soundboard::playback::output::{default_device_name, list_devices};
use soundboard::playback::{CpalDevice, SilentDevice};
use soundboard::ui::{self, App};
use soundboard::{Completion, PlaybackDevice, ProjectFile, Session, SlotId, Transition};

/// Knights soundboard: one clip at a time, saved as a single JSON project
#[derive(Parser, Debug)]
#[command(name = "soundboard", version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Play without sound output
    #[arg(long, global = true)]
    silent: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal UI (default)
    Tui {
        /// Project to open at start
        project: Option<PathBuf>,
    },
    /// Write an empty project file
    New {
        /// Output path (defaults to today's file name)
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show the slots of a project
    List {
        /// Project file
        project: PathBuf,
        /// Include empty slots
        #[arg(short, long)]
        all: bool,
    },
    /// Put an audio file into a slot
    Assign {
        /// Project file, updated in place
        project: PathBuf,
        /// Slot id, e.g. btn_section1_0
        slot: String,
        /// Audio file
        audio: PathBuf,
    },
    /// Remove the clip from a slot
    Delete {
        /// Project file, updated in place
        project: PathBuf,
        /// Slot id
        slot: String,
        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
    /// Play one slot to the end
    Play {
        /// Project file
        project: PathBuf,
        /// Slot id
        slot: String,
    },
    /// Print the team colors of a logo image
    Palette {
        /// Image file
        image: PathBuf,
    },
    /// Show the preset catalog searches
    Presets {
        /// JSON track list to search
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List audio output devices
    Devices,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    let command = cli.command.unwrap_or(Command::Tui { project: None });
    let tui = matches!(command, Command::Tui { .. });
    init_logging(&config, tui)?;

    match command {
        Command::Tui { project } => run_tui(&config, cli.silent, project.as_deref()),
        Command::New { output, force } => new_project(output, force),
        Command::List { project, all } => list_project(&project, all),
        Command::Assign {
            project,
            slot,
            audio,
        } => assign_clip(&project, &SlotId::new(slot), &audio),
        Command::Delete { project, slot, yes } => delete_clip(&project, &SlotId::new(slot), yes),
        Command::Play { project, slot } => {
            play_slot(&config, cli.silent, &project, &SlotId::new(slot))
        }
        Command::Palette { image } => print_palette(&image),
        Command::Presets { catalog } => show_presets(catalog.as_deref()),
        Command::Devices => {
            print_devices();
            Ok(())
        }
    }
}

/// Install the fmt subscriber. The TUI owns the terminal, so its logs go
/// to the configured file or nowhere.
fn init_logging(config: &AppConfig, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if !tui {
        builder.with_writer(std::io::stderr).init();
        return Ok(());
    }

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn make_device(config: &AppConfig, silent: bool) -> Box<dyn PlaybackDevice> {
    if silent || config.playback.backend == Backend::Silent {
        Box::new(SilentDevice::new())
    } else {
        Box::new(CpalDevice::new())
    }
}

fn make_session(config: &AppConfig, silent: bool) -> Session {
    Session::new(make_device(config, silent))
        .with_volume(config.playback.volume)
        .with_theme(config.theme.clone())
}

/// Session without audio, for editing project files
fn editing_session(project: &Path) -> Result<Session> {
    let mut session = Session::new(Box::new(SilentDevice::new()));
    session
        .load_project(project)
        .with_context(|| format!("Failed to load project: {:?}", project))?;
    Ok(session)
}

fn run_tui(config: &AppConfig, silent: bool, project: Option<&Path>) -> Result<()> {
    let mut session = make_session(config, silent);
    if let Some(path) = project {
        session
            .load_project(path)
            .with_context(|| format!("Failed to load project: {:?}", path))?;
    }

    info!("starting terminal UI");
    let mut app = App::new(&config.ui).context("Failed to set up terminal")?;
    app.run(&mut session).context("Terminal UI failed")?;
    Ok(())
}

fn new_project(output: Option<PathBuf>, force: bool) -> Result<()> {
    let path = output.unwrap_or_else(|| {
        PathBuf::from(ProjectFile::default_file_name(chrono::Local::now().date_naive()))
    });
    if path.exists() && !force {
        bail!("{:?} already exists (use --force to overwrite)", path);
    }

    let session = Session::new(Box::new(SilentDevice::new()));
    session
        .save_project(&path)
        .with_context(|| format!("Failed to write project: {:?}", path))?;
    println!(
        "Created {} with {} empty slots",
        path.display(),
        session.board().slot_count()
    );
    Ok(())
}

fn list_project(project: &Path, all: bool) -> Result<()> {
    let session = editing_session(project)?;
    let board = session.board();

    for section in board.sections() {
        println!(
            "{} ({}/{} loaded, capacity {})",
            section.id().title(),
            section.loaded_count(),
            section.len(),
            section.capacity()
        );
        for slot in section.slots().iter().filter(|s| all || s.is_loaded()) {
            let file = slot
                .clip()
                .map(|c| format!("  [{}, {} bytes]", c.filename(), c.len()))
                .unwrap_or_default();
            println!(
                "  {} {:<18} {}{}",
                ui::slot_glyph(slot),
                slot.id(),
                slot.label(),
                file
            );
        }
    }
    Ok(())
}

fn assign_clip(project: &Path, slot: &SlotId, audio: &Path) -> Result<()> {
    let mut session = editing_session(project)?;
    let label = session
        .upload_clip(slot, audio)
        .with_context(|| format!("Failed to assign {:?} to {}", audio, slot))?
        .label()
        .to_string();
    session.save_project(project)?;
    println!("{} now plays \"{}\"", slot, label);
    Ok(())
}

fn delete_clip(project: &Path, slot: &SlotId, yes: bool) -> Result<()> {
    if !yes {
        bail!("deleting a clip cannot be undone; pass --yes to confirm");
    }
    let mut session = editing_session(project)?;
    let label = session.delete_clip(slot)?.label().to_string();
    session.save_project(project)?;
    println!("Cleared {} ({})", slot, label);
    Ok(())
}

fn play_slot(config: &AppConfig, silent: bool, project: &Path, slot: &SlotId) -> Result<()> {
    let mut session = make_session(config, silent);
    session
        .load_project(project)
        .with_context(|| format!("Failed to load project: {:?}", project))?;

    match session.toggle(slot)? {
        Transition::Ignored => bail!("{} has no clip", slot),
        _ => println!("Playing {} (Ctrl+C to stop)", slot),
    }

    loop {
        if let Some((_, completion)) = session.poll() {
            match completion {
                Completion::Ended => {
                    println!("Finished");
                    return Ok(());
                }
                Completion::Error(msg) => bail!("playback failed: {}", msg),
            }
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn print_palette(image: &Path) -> Result<()> {
    let upload = Upload::image(image).with_context(|| format!("Failed to read {:?}", image))?;
    let palette = media::extract_palette(&upload.bytes)?;
    if palette.is_empty() {
        println!("No usable colors found");
    }
    for (role, color) in ["primary", "secondary", "accent"].iter().zip(&palette) {
        println!("{:<10} {}", role, color);
    }
    Ok(())
}

fn show_presets(catalog: Option<&Path>) -> Result<()> {
    let Some(path) = catalog else {
        for preset in &PRESET_BUTTONS {
            println!("{} {:<10} \"{}\"", preset.emoji, preset.title, preset.search_query);
        }
        return Ok(());
    };

    let mut session = CatalogSession::new(InMemoryCatalog::load(path)?);
    let status = session.authorize();
    println!("Catalog access: {}", status);

    for preset in &PRESET_BUTTONS {
        let tracks = session.search_preset(preset)?;
        println!("{} {} ({} tracks)", preset.emoji, preset.title, tracks.len());
        for track in tracks.iter().take(5) {
            println!("    {} - {}", track.title, track.artist);
        }
    }
    Ok(())
}

fn print_devices() {
    let default = default_device_name();
    let devices = list_devices();
    if devices.is_empty() {
        println!("No audio output devices found");
    }
    for name in devices {
        let marker = if Some(&name) == default.as_ref() { "*" } else { " " };
        println!("{} {}", marker, name);
    }
}
