/// Entities: Wall, Treasure, Bomb, Candy, Player.
/// Kinds are a closed set; behaviour on contact lives in `rules`.

use super::coord::Coord;

/// Most lives a player can hold.
pub const MAX_LIVES: u8 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EntityKind {
    Wall,
    Treasure,
    Bomb,
    Candy,
    Player,
}

impl EntityKind {
    /// Map-file dispatch table. Anything else is an empty cell.
    pub fn from_symbol(ch: char) -> Option<EntityKind> {
        match ch {
            '@' => Some(EntityKind::Treasure),
            '*' => Some(EntityKind::Player),
            'w' => Some(EntityKind::Wall),
            'b' => Some(EntityKind::Bomb),
            'c' => Some(EntityKind::Candy),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            EntityKind::Treasure => '@',
            EntityKind::Player => '*',
            EntityKind::Wall => 'w',
            EntityKind::Bomb => 'b',
            EntityKind::Candy => 'c',
        }
    }

    /// Display colour. Has no effect on game rules.
    pub fn color(self) -> Rgb {
        match self {
            EntityKind::Wall => Rgb(255, 255, 255),
            EntityKind::Treasure => Rgb(0, 0, 255),
            EntityKind::Bomb => Rgb(255, 255, 0),
            EntityKind::Candy => Rgb(255, 105, 180),
            EntityKind::Player => Rgb(255, 0, 0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Stable handle into the world's entity arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn new(raw: u32) -> Self {
        EntityId(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Coord,
}

/// The distinguished player: its entity handle plus lives and input cooldown.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: EntityId,
    pub lives: u8,
    /// Frame of the last poll that passed the cooldown. Starts at the spawn
    /// frame, so a fresh player waits out one full cooldown.
    last_poll: u64,
}

impl Player {
    pub fn new(id: EntityId, spawned_at: u64) -> Self {
        Player { id, lives: MAX_LIVES, last_poll: spawned_at }
    }

    /// Apply a configured starting value. Values outside 1..=MAX_LIVES are
    /// ignored and the current value kept. Returns whether it was applied.
    pub fn set_starting_lives(&mut self, lives: u8) -> bool {
        if (1..=MAX_LIVES).contains(&lives) {
            self.lives = lives;
            true
        } else {
            false
        }
    }

    /// Has `cooldown` frames passed since the last eligible poll?
    pub fn cooldown_ready(&self, frame: u64, cooldown: u64) -> bool {
        frame.saturating_sub(self.last_poll) >= cooldown
    }

    pub fn mark_polled(&mut self, frame: u64) {
        self.last_poll = frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_table() {
        assert_eq!(EntityKind::from_symbol('@'), Some(EntityKind::Treasure));
        assert_eq!(EntityKind::from_symbol('*'), Some(EntityKind::Player));
        assert_eq!(EntityKind::from_symbol('w'), Some(EntityKind::Wall));
        assert_eq!(EntityKind::from_symbol('b'), Some(EntityKind::Bomb));
        assert_eq!(EntityKind::from_symbol('c'), Some(EntityKind::Candy));
        for ch in [' ', 'W', 'p', '#', '-', 'é'] {
            assert_eq!(EntityKind::from_symbol(ch), None, "{ch:?}");
        }
    }

    #[test]
    fn symbol_is_inverse_of_dispatch() {
        for kind in [
            EntityKind::Wall,
            EntityKind::Treasure,
            EntityKind::Bomb,
            EntityKind::Candy,
            EntityKind::Player,
        ] {
            assert_eq!(EntityKind::from_symbol(kind.symbol()), Some(kind));
        }
    }

    #[test]
    fn starting_lives_out_of_range_keeps_prior() {
        let mut p = Player::new(EntityId::new(0), 0);
        assert!(p.set_starting_lives(2));
        assert_eq!(p.lives, 2);
        assert!(!p.set_starting_lives(0));
        assert!(!p.set_starting_lives(4));
        assert_eq!(p.lives, 2);
    }

    #[test]
    fn cooldown_counts_from_last_eligible_poll() {
        let mut p = Player::new(EntityId::new(0), 0);
        p.mark_polled(4);
        assert!(!p.cooldown_ready(5, 3));
        assert!(!p.cooldown_ready(6, 3));
        assert!(p.cooldown_ready(7, 3));
    }

    #[test]
    fn cooldown_starts_at_spawn() {
        let p = Player::new(EntityId::new(0), 10);
        assert!(!p.cooldown_ready(10, 3));
        assert!(!p.cooldown_ready(12, 3));
        assert!(p.cooldown_ready(13, 3));
        assert!(Player::new(EntityId::new(0), 0).cooldown_ready(0, 0));
    }
}
