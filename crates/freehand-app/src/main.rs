//! Command-line entry point.

use clap::Parser;
use freehand_app::{App, AppConfig, AppResult, CommandOutcome};
use freehand_core::{Command, SHORTCUTS};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "freehand", about = "Freehand whiteboard")]
struct Cli {
    /// Scene file to open.
    scene: Option<PathBuf>,

    /// Write a PNG of all content to this path.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Palette command to run after loading, as NAME or NAME=ARG. Repeatable.
    #[arg(long = "run", value_name = "NAME[=ARG]")]
    commands: Vec<String>,

    /// JSON config file.
    #[arg(long, env = "FREEHAND_CONFIG")]
    config: Option<PathBuf>,
}

fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let mut app = App::with_file_storage(config)?;

    if let Some(path) = &cli.scene {
        app.open_file(path)?;
    }
    log::info!(
        "{} elements, {} library items",
        app.canvas().store.len(),
        app.library.len()
    );

    for shortcut in SHORTCUTS {
        println!("{:<16} {}", shortcut.format(), shortcut.description);
    }

    for entry in &cli.commands {
        let (name, argument) = match entry.split_once('=') {
            Some((name, argument)) => (name, Some(argument)),
            None => (entry.as_str(), None),
        };
        let command: Command = name.parse()?;
        match app.execute(command, argument)? {
            CommandOutcome::Palette(colors) => println!("{}: {}", command.label(), colors.join(" ")),
            CommandOutcome::Written(bytes) => println!("{}: wrote {bytes} bytes", command.label()),
            CommandOutcome::Done => println!("{}: done", command.label()),
        }
    }

    if let Some(path) = &cli.export {
        let bytes = app.export_content_png(path)?;
        println!("Exported {} ({bytes} bytes)", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Starting Freehand");

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
