/// LevelSequencer: plays the queued maps in order, carrying score and lives.
///
///   Won      → level-cleared screen, next map (or victory when none left)
///   Defeated → game-over screen, remaining maps discarded
///   Closed   → stop at once, no screen

use std::collections::VecDeque;
use std::io;

use thiserror::Error;

use super::frontend::Frontend;
use super::level::{self, LevelSource, LoadError};
use super::session::{Carry, GameSession, Outcome, SessionSettings};
use super::view::LevelInfo;
use super::world::World;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameResult {
    Victory { score: i64 },
    Defeat { score: i64 },
    Quit { score: i64 },
}

impl GameResult {
    pub fn score(&self) -> i64 {
        match *self {
            GameResult::Victory { score } | GameResult::Defeat { score } | GameResult::Quit { score } => score,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("frontend I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub struct LevelSequencer {
    queue: VecDeque<LevelSource>,
    settings: SessionSettings,
    carry: Carry,
    total: usize,
}

impl LevelSequencer {
    pub fn new(sources: Vec<LevelSource>, settings: SessionSettings, carry: Carry) -> Self {
        LevelSequencer {
            total: sources.len(),
            queue: sources.into(),
            settings,
            carry,
        }
    }

    pub fn carry(&self) -> Carry {
        self.carry
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Load every queued map into a scratch world without playing it.
    pub fn validate(&self) -> Result<(), LoadError> {
        for src in &self.queue {
            let map = src.load()?;
            let mut scratch = World::new(self.settings.field);
            level::populate(&mut scratch, &map, &src.name())?;
        }
        Ok(())
    }

    /// Pop the next map and build its session from the current carry.
    pub fn next_session(&mut self) -> Result<Option<GameSession>, LoadError> {
        let Some(src) = self.queue.pop_front() else { return Ok(None) };
        let map = src.load()?;
        let info = LevelInfo {
            name: src.name(),
            number: self.total - self.queue.len(),
            count: self.total,
        };
        GameSession::load(&map, info, &self.settings, self.carry).map(Some)
    }

    pub fn run<F: Frontend + ?Sized>(&mut self, frontend: &mut F) -> Result<GameResult, RunError> {
        loop {
            let Some(mut session) = self.next_session()? else {
                tracing::info!(score = self.carry.score, "all levels cleared");
                frontend.show_victory(self.carry.score)?;
                return Ok(GameResult::Victory { score: self.carry.score });
            };

            let outcome = session.run(frontend)?;
            self.carry = session.carry();
            tracing::info!(
                level = %session.level.name,
                ?outcome,
                score = self.carry.score,
                lives = self.carry.lives,
                frames = session.frame,
                "level finished"
            );

            match outcome {
                Outcome::Won => frontend.show_level_cleared(&session.view())?,
                Outcome::Defeated => {
                    frontend.show_game_over(&session.view())?;
                    self.queue.clear();
                    return Ok(GameResult::Defeat { score: self.carry.score });
                }
                Outcome::Closed => {
                    return Ok(GameResult::Quit { score: self.carry.score });
                }
            }
        }
    }
}
