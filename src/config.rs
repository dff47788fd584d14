/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::rules::PlayField;
use crate::sim::session::{Carry, SessionSettings};
use crate::sim::view::Viewport;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub field: PlayField,
    pub cell_size: u32,
    pub frame_delay_ms: u64,
    pub move_cooldown_frames: u64,
    pub starting_lives: u8,
    pub starting_score: i64,
    pub maps_dir: PathBuf,
    pub gamepad: GamepadConfig,
    /// Where the settings came from, `None` = built-in defaults.
    pub source: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    field: TomlField,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlField {
    #[serde(default = "default_columns")]
    columns: i32,
    #[serde(default = "default_rows")]
    rows: i32,
    #[serde(default = "default_cell_size")]
    cell_size: u32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_delay")]
    frame_delay_ms: u64,
    #[serde(default = "default_move_cooldown")]
    move_cooldown_frames: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_lives")]
    starting_lives: u8,
    #[serde(default)]
    starting_score: i64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_maps_dir")]
    maps_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_quit_buttons")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_columns() -> i32 { 32 }
fn default_rows() -> i32 { 24 }
fn default_cell_size() -> u32 { 25 }     // 800x600 window / 32x24 cells
fn default_frame_delay() -> u64 { 30 }
fn default_move_cooldown() -> u64 { 3 }
fn default_lives() -> u8 { 3 }
fn default_maps_dir() -> String { "maps".into() }
fn default_quit_buttons() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlField {
    fn default() -> Self {
        TomlField {
            columns: default_columns(),
            rows: default_rows(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_delay_ms: default_frame_delay(),
            move_cooldown_frames: default_move_cooldown(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { starting_lives: default_lives(), starting_score: 0 }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { maps_dir: default_maps_dir() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { quit: default_quit_buttons() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let (toml_cfg, source) = load_toml(&search_dirs);
        Self::resolve(toml_cfg, source, &search_dirs)
    }

    /// Parse config text directly (no maps-dir search).
    #[cfg(test)]
    fn parse(text: &str) -> Self {
        let cfg = toml::from_str::<TomlConfig>(text).unwrap_or_default();
        Self::resolve(cfg, None, &[])
    }

    fn resolve(toml_cfg: TomlConfig, source: Option<PathBuf>, search_dirs: &[PathBuf]) -> Self {
        let maps_dir = resolve_maps_dir(&toml_cfg.general.maps_dir, search_dirs);

        let mut field = PlayField {
            columns: toml_cfg.field.columns,
            rows: toml_cfg.field.rows,
        };
        if field.columns <= 0 || field.rows <= 0 {
            tracing::warn!(?field, "play field must be positive, using 32x24");
            field = PlayField::DEFAULT;
        }

        GameConfig {
            field,
            cell_size: toml_cfg.field.cell_size.max(1),
            frame_delay_ms: toml_cfg.timing.frame_delay_ms,
            move_cooldown_frames: toml_cfg.timing.move_cooldown_frames,
            starting_lives: toml_cfg.player.starting_lives,
            starting_score: toml_cfg.player.starting_score,
            maps_dir,
            gamepad: GamepadConfig { quit: toml_cfg.gamepad.quit },
            source,
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            field: self.field,
            viewport: Viewport::new(self.cell_size),
            move_cooldown: self.move_cooldown_frames,
        }
    }

    pub fn starting_carry(&self) -> Carry {
        Carry { score: self.starting_score, lives: self.starting_lives }
    }
}

/// Absolute paths are used as-is; relative ones are looked up in the
/// candidate dirs, then left relative to CWD.
fn resolve_maps_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs
        .iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> (TomlConfig, Option<PathBuf>) {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "config loaded");
                    return (cfg, Some(path));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "config.toml parse error, using defaults");
                    return (TomlConfig::default(), None);
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read config");
            }
        }
    }
    tracing::info!("no config.toml found, using defaults");
    (TomlConfig::default(), None)
}
