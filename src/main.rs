/// Entry point: load config and maps, take over the terminal, play the
/// level sequence, restore the terminal and print the result.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use anyhow::{Context, Result};

use config::GameConfig;
use sim::level;
use sim::sequencer::{GameResult, LevelSequencer};
use ui::terminal::TerminalFrontend;

fn main() -> Result<()> {
    let (_log_guard, log_path) = logging::init()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), log = %log_path.display(), "starting");

    let config = GameConfig::load();
    if let Some(src) = &config.source {
        tracing::debug!(path = %src.display(), ?config, "effective config");
    }

    let sources = level::sources_for(&config.maps_dir);
    let mut sequencer = LevelSequencer::new(sources, config.session_settings(), config.starting_carry());

    // A broken map must fail before raw mode, so the error stays readable.
    sequencer
        .validate()
        .with_context(|| format!("invalid map in {}", config.maps_dir.display()))?;

    let mut frontend = TerminalFrontend::new(&config);
    frontend.init().context("terminal init failed")?;

    let result = sequencer.run(&mut frontend);

    if let Err(e) = frontend.cleanup() {
        tracing::error!(error = %e, "terminal cleanup failed");
        eprintln!("Terminal cleanup failed: {e}");
    }

    let result = result.context("game aborted")?;
    tracing::info!(?result, "game over");

    println!();
    match result {
        GameResult::Victory { .. } => println!("All levels cleared!"),
        GameResult::Defeat { .. } => println!("Out of lives."),
        GameResult::Quit { .. } => println!("Quit."),
    }
    println!("Final Score: {}", result.score());
    Ok(())
}
