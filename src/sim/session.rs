/// GameSession: one level being played.
///
/// ## Frame order
///   1. Quit signal → Closed (nothing else happens this frame)
///   2. Optional position-index dump to the log
///   3. Player movement (cooldown-gated, Down/Up/Right/Left each validated)
///   4. Defeat check (lives == 0), pre-empts the win check
///   5. Win check (no treasure left)
///   6. Render, then advance the frame counter
///
/// Steps 1–5 are `update()`, which does no I/O. `run()` adds polling,
/// rendering and pacing around it.

use std::io;

use crate::domain::coord::{Coord, Direction};
use crate::domain::entity::{EntityKind, Player};
use crate::domain::grid::GridMap;
use crate::domain::rules::{self, Pickup, PlayField};
use super::event::GameEvent;
use super::frontend::{FrameInput, Frontend};
use super::level::{self, LoadError};
use super::step::{self, MoveRejected};
use super::view::{FrameView, LevelInfo, Sprite, Viewport};
use super::world::World;

/// How a session ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Won,
    Defeated,
    Closed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Running,
    Finished(Outcome),
}

/// Per-session tuning, fixed for the whole run.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub field: PlayField,
    pub viewport: Viewport,
    pub move_cooldown: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            field: PlayField::DEFAULT,
            viewport: Viewport::default(),
            move_cooldown: 3,
        }
    }
}

/// State carried from one level to the next.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Carry {
    pub score: i64,
    pub lives: u8,
}

pub struct GameSession {
    pub world: World,
    pub player: Player,
    pub score: i64,
    pub treasures_remaining: usize,
    pub bombs_collected: u32,
    pub frame: u64,
    pub state: SessionState,
    pub level: LevelInfo,
    settings: SessionSettings,
}

impl GameSession {
    /// Build a session from a parsed map, importing carried score and lives.
    pub fn load(
        map: &GridMap,
        level: LevelInfo,
        settings: &SessionSettings,
        carry: Carry,
    ) -> Result<Self, LoadError> {
        let mut world = World::new(settings.field);
        let player_id = level::populate(&mut world, map, &level.name)?;

        let mut player = Player::new(player_id, 0);
        if !player.set_starting_lives(carry.lives) {
            tracing::warn!(lives = carry.lives, "starting lives out of range, keeping {}", player.lives);
        }

        let treasures_remaining = world.count(EntityKind::Treasure);
        tracing::info!(
            level = %level.name,
            entities = world.len(),
            treasures = treasures_remaining,
            "level loaded"
        );

        Ok(GameSession {
            world,
            player,
            score: carry.score,
            treasures_remaining,
            bombs_collected: 0,
            frame: 0,
            state: SessionState::Running,
            level,
            settings: settings.clone(),
        })
    }

    pub fn lives(&self) -> u8 {
        self.player.lives
    }

    pub fn carry(&self) -> Carry {
        Carry { score: self.score, lives: self.player.lives }
    }

    /// Advance the simulation by one frame's input. No-op once finished.
    pub fn update(&mut self, input: &FrameInput) -> Vec<GameEvent> {
        if self.state != SessionState::Running {
            return vec![];
        }

        let mut events = Vec::new();

        if input.quit {
            self.state = SessionState::Finished(Outcome::Closed);
            events.push(GameEvent::QuitRequested);
            return events;
        }

        if input.dump_positions {
            for (pos, kind) in self.world.bindings() {
                tracing::debug!(%pos, ?kind, "position index");
            }
        }

        self.move_player(input, &mut events);

        if self.player.lives == 0 {
            self.state = SessionState::Finished(Outcome::Defeated);
            events.push(GameEvent::PlayerDefeated);
        } else if self.treasures_remaining == 0 {
            self.state = SessionState::Finished(Outcome::Won);
            events.push(GameEvent::LevelCleared);
        }

        events
    }

    pub fn advance_frame(&mut self) {
        self.frame += 1;
    }

    /// Play until the session reaches a terminal outcome.
    pub fn run<F: Frontend + ?Sized>(&mut self, frontend: &mut F) -> io::Result<Outcome> {
        loop {
            let input = frontend.poll_input()?;
            let events = self.update(&input);
            log_events(&events);

            if self.state == SessionState::Finished(Outcome::Closed) {
                return Ok(Outcome::Closed);
            }

            frontend.render(&self.view())?;
            self.advance_frame();

            if let SessionState::Finished(outcome) = self.state {
                return Ok(outcome);
            }
            frontend.pace();
        }
    }

    pub fn view(&self) -> FrameView {
        let viewport = self.settings.viewport;
        FrameView {
            sprites: self
                .world
                .entities()
                .map(|e| Sprite { kind: e.kind, color: e.kind.color(), rect: viewport.rect_for(e.pos) })
                .collect(),
            viewport,
            field_columns: self.settings.field.columns,
            field_rows: self.settings.field.rows,
            score: self.score,
            lives: self.player.lives,
            treasures_left: self.treasures_remaining,
            level: self.level.clone(),
            frame: self.frame,
        }
    }

    // ── Movement ──

    fn move_player(&mut self, input: &FrameInput, events: &mut Vec<GameEvent>) {
        if !self.player.cooldown_ready(self.frame, self.settings.move_cooldown) {
            return;
        }
        self.player.mark_polled(self.frame);

        for dir in Direction::POLL_ORDER {
            if !input.held(dir) {
                continue;
            }
            match step::attempt_move(&mut self.world, self.player.id, dir) {
                Ok(s) => {
                    if let Some(pickup) = s.pickup {
                        self.apply_pickup(pickup, s.to, events);
                    }
                    events.push(GameEvent::PlayerMoved { from: s.from, to: s.to });
                }
                Err(MoveRejected::Blocked { target, by }) => {
                    events.push(GameEvent::MoveBlocked { target, by: Some(by) });
                }
                Err(MoveRejected::OutOfBounds { target }) => {
                    events.push(GameEvent::MoveBlocked { target, by: None });
                }
                Err(e @ MoveRejected::UnknownEntity(_)) => {
                    tracing::error!(error = %e, "player entity missing from world");
                    return;
                }
            }
            if self.player.lives == 0 {
                break;
            }
        }
    }

    fn apply_pickup(&mut self, pickup: Pickup, at: Coord, events: &mut Vec<GameEvent>) {
        let fx = pickup.effect();
        self.score += fx.score;
        self.player.lives = rules::adjust_lives(self.player.lives, fx.lives);
        self.bombs_collected += fx.bombs as u32;
        if fx.treasures < 0 {
            self.treasures_remaining = self.treasures_remaining.saturating_sub(fx.treasures.unsigned_abs() as usize);
        }

        events.push(match pickup {
            Pickup::Treasure => GameEvent::TreasureCollected { at, remaining: self.treasures_remaining },
            Pickup::Bomb => GameEvent::BombHit { at, lives: self.player.lives },
            Pickup::Candy => GameEvent::CandyEaten { at, lives: self.player.lives },
        });
    }
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::MoveBlocked { .. } | GameEvent::PlayerMoved { .. } => tracing::trace!(?event),
            GameEvent::LevelCleared | GameEvent::PlayerDefeated | GameEvent::QuitRequested => {
                tracing::info!(?event, "session finished")
            }
            _ => tracing::debug!(?event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(text: &str, carry: Carry) -> GameSession {
        let map = GridMap::parse(text).unwrap();
        let level = LevelInfo { name: "test".into(), number: 1, count: 1 };
        GameSession::load(&map, level, &SessionSettings::default(), carry).unwrap()
    }

    /// A session past the spawn cooldown, ready to accept a move.
    fn session(text: &str, carry: Carry) -> GameSession {
        let mut s = fresh(text, carry);
        for _ in 0..SessionSettings::default().move_cooldown {
            s.advance_frame();
        }
        s
    }

    fn start() -> Carry {
        Carry { score: 0, lives: 3 }
    }

    fn player_pos(s: &GameSession) -> Coord {
        s.world.get(s.player.id).unwrap().pos
    }

    fn right() -> FrameInput {
        FrameInput::default().with(Direction::Right)
    }

    #[test]
    fn wall_blocks_without_side_effects() {
        let mut s = session("4, 1\n-\n*w@\n", start());
        let before = s.world.bindings();
        let events = s.update(&right());
        assert_eq!(player_pos(&s), Coord::new(0, 0));
        assert_eq!((s.score, s.lives()), (0, 3));
        assert_eq!(s.world.bindings(), before);
        assert_eq!(s.state, SessionState::Running);
        assert_eq!(
            events,
            vec![GameEvent::MoveBlocked { target: Coord::new(1, 0), by: Some(EntityKind::Wall) }]
        );
    }

    #[test]
    fn last_treasure_wins() {
        let mut s = session("5, 5\n-\n\n\n\n  *@\n", start());
        assert_eq!(player_pos(&s), Coord::new(2, 3));
        assert_eq!(s.treasures_remaining, 1);
        s.update(&right());
        assert_eq!(s.score, 10);
        assert_eq!(s.treasures_remaining, 0);
        assert_eq!(player_pos(&s), Coord::new(3, 3));
        assert_eq!(s.state, SessionState::Finished(Outcome::Won));
        assert!(s.world.index_consistent());
    }

    #[test]
    fn bomb_on_last_life_defeats() {
        let mut s = session("3, 1\n-\n*b@\n", Carry { score: 0, lives: 1 });
        s.update(&right());
        assert_eq!(s.lives(), 0);
        assert_eq!(s.bombs_collected, 1);
        assert_eq!(s.score, -10);
        assert_eq!(s.state, SessionState::Finished(Outcome::Defeated));
    }

    #[test]
    fn defeat_preempts_win() {
        // No treasure on the map, so the win check would also fire.
        let mut s = session("2, 1\n-\n*b\n", Carry { score: 0, lives: 1 });
        assert_eq!(s.treasures_remaining, 0);
        s.update(&right());
        assert_eq!(s.state, SessionState::Finished(Outcome::Defeated));
    }

    #[test]
    fn candy_at_max_lives_is_still_eaten() {
        let mut s = session("3, 1\n-\n*c@\n", start());
        s.update(&right());
        assert_eq!(s.lives(), 3);
        assert_eq!(s.score, 0);
        assert_eq!(s.world.count(EntityKind::Candy), 0);
        assert_eq!(player_pos(&s), Coord::new(1, 0));
    }

    #[test]
    fn candy_restores_a_life() {
        let mut s = session("3, 1\n-\n*c@\n", Carry { score: 5, lives: 2 });
        s.update(&right());
        assert_eq!(s.lives(), 3);
        assert_eq!(s.score, 5);
    }

    #[test]
    fn cooldown_allows_one_move_in_three_frames() {
        let mut s = session("8, 1\n-\n*     @\n", start());
        for _ in 0..3 {
            s.update(&right());
            s.advance_frame();
        }
        assert_eq!(player_pos(&s), Coord::new(1, 0));
        s.update(&right());
        assert_eq!(player_pos(&s), Coord::new(2, 0));
    }

    #[test]
    fn spawn_starts_the_cooldown() {
        let mut s = fresh("8, 1\n-\n*     @\n", start());
        for _ in 0..3 {
            assert!(s.update(&right()).is_empty());
            s.advance_frame();
        }
        assert_eq!(player_pos(&s), Coord::new(0, 0));
        s.update(&right());
        assert_eq!(player_pos(&s), Coord::new(1, 0));
    }

    #[test]
    fn idle_eligible_frame_restarts_cooldown() {
        let mut s = session("8, 1\n-\n*     @\n", start());
        s.update(&FrameInput::default()); // frame 0: eligible, nothing held
        s.advance_frame();
        s.update(&right()); // frame 1: still cooling down
        assert_eq!(player_pos(&s), Coord::new(0, 0));
    }

    #[test]
    fn opposite_directions_cancel() {
        let mut s = session("5, 3\n-\n@\n  *\n", start());
        let input = FrameInput::default().with(Direction::Left).with(Direction::Right);
        s.update(&input);
        assert_eq!(player_pos(&s), Coord::new(2, 1));
    }

    #[test]
    fn compound_diagonal_step() {
        let mut s = session("5, 3\n-\n@\n  *\n", start());
        let input = FrameInput::default().with(Direction::Down).with(Direction::Right);
        s.update(&input);
        assert_eq!(player_pos(&s), Coord::new(3, 2));
    }

    #[test]
    fn quit_short_circuits_movement() {
        let mut s = session("3, 1\n-\n* @\n", start());
        let input = FrameInput { quit: true, right: true, ..Default::default() };
        let events = s.update(&input);
        assert_eq!(events, vec![GameEvent::QuitRequested]);
        assert_eq!(player_pos(&s), Coord::new(0, 0));
        assert_eq!(s.state, SessionState::Finished(Outcome::Closed));
    }

    #[test]
    fn finished_session_ignores_input() {
        let mut s = session("3, 1\n-\n*@ \n", start());
        s.update(&right());
        assert_eq!(s.state, SessionState::Finished(Outcome::Won));
        s.advance_frame();
        s.advance_frame();
        s.advance_frame();
        assert!(s.update(&right()).is_empty());
        assert_eq!(player_pos(&s), Coord::new(1, 0));
    }

    #[test]
    fn out_of_range_starting_lives_keep_default() {
        let s = session("2, 1\n-\n*@\n", Carry { score: 0, lives: 9 });
        assert_eq!(s.lives(), 3);
    }

    #[test]
    fn index_stays_consistent_through_a_walk() {
        let mut s = session("6, 3\n-\nwc b@w\n*    w\n", start());
        let path = [
            Direction::Up,
            Direction::Right,
            Direction::Up,
            Direction::Right,
            Direction::Right,
            Direction::Right,
        ];
        for dir in path {
            s.update(&FrameInput::default().with(dir));
            for _ in 0..3 {
                s.advance_frame();
            }
            assert!(s.world.index_consistent());
            assert_eq!(s.world.occupant(player_pos(&s)).map(|e| e.id), Some(s.player.id));
        }
        assert_eq!(player_pos(&s), Coord::new(4, 0));
        assert_eq!((s.score, s.lives(), s.bombs_collected), (0, 2, 1));
        assert_eq!(s.state, SessionState::Finished(Outcome::Won));
        assert_eq!(s.world.len(), 4);
    }

    #[test]
    fn view_lists_every_live_entity() {
        let s = session("3, 1\n-\n*@w\n", start());
        let v = s.view();
        assert_eq!(v.sprites.len(), 3);
        let player = v.sprites.iter().find(|sp| sp.kind == EntityKind::Player).unwrap();
        assert_eq!((player.rect.x, player.rect.y), (0, 0));
        assert_eq!(player.color, EntityKind::Player.color());
        let wall = v.sprites.iter().find(|sp| sp.kind == EntityKind::Wall).unwrap();
        assert_eq!(wall.rect.x, 50);
        assert_eq!(v.treasures_left, 1);
    }
}
