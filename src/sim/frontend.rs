/// The seam between the simulation and the outside world.
///
/// A frontend supplies input once per frame, draws frames and the
/// between-level screens, and paces the loop. The terminal frontend lives in
/// `ui`; tests drive sessions with a scripted one.

use std::io;

use crate::domain::coord::Direction;
use super::view::FrameView;

/// Frame input. Directions are level-triggered: a held key reports `true`
/// every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub quit: bool,
    /// Log the position index.
    pub dump_positions: bool,
}

impl FrameInput {
    pub fn held(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn with(mut self, dir: Direction) -> Self {
        match dir {
            Direction::Up => self.up = true,
            Direction::Down => self.down = true,
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
        }
        self
    }

    pub fn quit() -> Self {
        FrameInput { quit: true, ..Default::default() }
    }
}

pub trait Frontend {
    fn poll_input(&mut self) -> io::Result<FrameInput>;

    fn render(&mut self, view: &FrameView) -> io::Result<()>;

    /// Shown after a level is cleared, before the next one loads.
    fn show_level_cleared(&mut self, view: &FrameView) -> io::Result<()>;

    fn show_game_over(&mut self, view: &FrameView) -> io::Result<()>;

    /// Shown once every level in the sequence is cleared.
    fn show_victory(&mut self, score: i64) -> io::Result<()>;

    /// Wait out the rest of the frame.
    fn pace(&mut self) {}
}
