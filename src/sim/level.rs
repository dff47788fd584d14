/// Level sources and map loading.
///
/// ## Sources (priority order):
///   1. `maps/` directory (every `.txt` file, played in file-name order)
///   2. Built-in embedded maps
///
/// ## Symbols:
///   'w' = Wall        '@' = Treasure      'b' = Bomb
///   'c' = Candy       '*' = Player spawn  anything else = empty

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::coord::Coord;
use crate::domain::entity::{EntityId, EntityKind};
use crate::domain::grid::{GridMap, ParseError};
use super::world::{CellOccupied, World};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read map {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("map {name}: {source}")]
    Parse { name: String, source: ParseError },
    #[error("map {name} has no player (`*`)")]
    MissingPlayer { name: String },
    #[error("map {name} has a second player at {at}")]
    DuplicatePlayer { name: String, at: Coord },
    #[error("map {name}: {source}")]
    Overlap { name: String, source: CellOccupied },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelSource {
    File(PathBuf),
    Embedded { name: &'static str, text: &'static str },
}

impl LevelSource {
    pub fn name(&self) -> String {
        match self {
            LevelSource::File(path) => path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            LevelSource::Embedded { name, .. } => name.to_string(),
        }
    }

    pub fn read(&self) -> Result<String, LoadError> {
        match self {
            LevelSource::File(path) => std::fs::read_to_string(path)
                .map_err(|source| LoadError::Io { path: path.clone(), source }),
            LevelSource::Embedded { text, .. } => Ok(text.to_string()),
        }
    }

    pub fn load(&self) -> Result<GridMap, LoadError> {
        let text = self.read()?;
        GridMap::parse(&text).map_err(|source| LoadError::Parse { name: self.name(), source })
    }
}

/// Every `.txt` file in `dir`, sorted by file name. A missing dir is empty;
/// any other read failure is returned.
pub fn discover(dir: &Path) -> io::Result<Vec<LevelSource>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e),
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().map_or(false, |x| x == "txt"))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths.into_iter().map(LevelSource::File).collect())
}

/// Maps from `dir`, or the embedded set if it has none or can't be read.
pub fn sources_for(dir: &Path) -> Vec<LevelSource> {
    match discover(dir) {
        Ok(found) if !found.is_empty() => {
            tracing::info!(dir = %dir.display(), count = found.len(), "map files found");
            found
        }
        Ok(_) => {
            tracing::info!(dir = %dir.display(), "no map files found, using built-in maps");
            embedded_levels()
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "maps directory unreadable, using built-in maps");
            embedded_levels()
        }
    }
}

/// Spawn one entity per recognised symbol. Returns the player's id.
pub fn populate(world: &mut World, map: &GridMap, name: &str) -> Result<EntityId, LoadError> {
    let mut player: Option<EntityId> = None;

    for (pos, ch) in map.cells() {
        let Some(kind) = EntityKind::from_symbol(ch) else { continue };
        if kind == EntityKind::Player && player.is_some() {
            return Err(LoadError::DuplicatePlayer { name: name.to_string(), at: pos });
        }
        let id = world
            .spawn(kind, pos)
            .map_err(|source| LoadError::Overlap { name: name.to_string(), source })?;
        if kind == EntityKind::Player {
            player = Some(id);
        }
    }

    player.ok_or_else(|| LoadError::MissingPlayer { name: name.to_string() })
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback maps
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelSource> {
    vec![
        LevelSource::Embedded { name: "map_0", text: include_str!("../../maps/map_0.txt") },
        LevelSource::Embedded { name: "map_1", text: include_str!("../../maps/map_1.txt") },
        LevelSource::Embedded { name: "map_2", text: include_str!("../../maps/map_2.txt") },
    ]
}
