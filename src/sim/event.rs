/// Events emitted during one session update.
/// The session logs them; tests assert on them.

use crate::domain::coord::Coord;
use crate::domain::entity::EntityKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { from: Coord, to: Coord },
    /// `by == None` means the play-field edge.
    MoveBlocked { target: Coord, by: Option<EntityKind> },
    TreasureCollected { at: Coord, remaining: usize },
    BombHit { at: Coord, lives: u8 },
    CandyEaten { at: Coord, lives: u8 },
    LevelCleared,
    PlayerDefeated,
    QuitRequested,
}
