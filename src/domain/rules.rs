/// Contact rules and play-field bounds.
///
/// Pure functions: they say what a contact *means*, the world and session
/// carry it out.
///
/// ## Contact table
/// ┌────────────┬─────────┬─────────┬───────────┬──────────────────────┐
/// │ Occupant   │ Move    │ Score   │ Lives     │ Other                │
/// ├────────────┼─────────┼─────────┼───────────┼──────────────────────┤
/// │ (empty)    │ ALLOW   │         │           │                      │
/// │ Wall       │ DENY    │         │           │                      │
/// │ Treasure   │ ALLOW   │ +10     │           │ treasures left -1    │
/// │ Bomb       │ ALLOW   │ -10     │ -1        │ bombs collected +1   │
/// │ Candy      │ ALLOW   │         │ +1 (≤3)   │                      │
/// │ Player     │ DENY    │         │           │ unreachable          │
/// └────────────┴─────────┴─────────┴───────────┴──────────────────────┘

use super::coord::Coord;
use super::entity::{EntityKind, MAX_LIVES};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pickup {
    Treasure,
    Bomb,
    Candy,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Blocked,
    Pickup(Pickup),
}

/// What stepping onto an occupied cell does.
pub fn on_contact(occupant: EntityKind) -> Contact {
    match occupant {
        EntityKind::Wall => Contact::Blocked,
        EntityKind::Treasure => Contact::Pickup(Pickup::Treasure),
        EntityKind::Bomb => Contact::Pickup(Pickup::Bomb),
        EntityKind::Candy => Contact::Pickup(Pickup::Candy),
        EntityKind::Player => Contact::Blocked,
    }
}

/// Counter changes caused by consuming a pickup.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PickupEffect {
    pub score: i64,
    pub lives: i8,
    pub treasures: i8,
    pub bombs: u8,
}

impl Pickup {
    pub fn effect(self) -> PickupEffect {
        match self {
            Pickup::Treasure => PickupEffect { score: 10, treasures: -1, ..Default::default() },
            Pickup::Bomb => PickupEffect { score: -10, lives: -1, bombs: 1, ..Default::default() },
            Pickup::Candy => PickupEffect { lives: 1, ..Default::default() },
        }
    }
}

/// Lives after a change, kept within 0..=MAX_LIVES.
pub fn adjust_lives(lives: u8, delta: i8) -> u8 {
    (lives as i16 + delta as i16).clamp(0, MAX_LIVES as i16) as u8
}

/// The fixed logical play field that bounds movement. Independent of the
/// loaded map's own size, so smaller maps leave open floor around them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlayField {
    pub columns: i32,
    pub rows: i32,
}

impl PlayField {
    pub const DEFAULT: PlayField = PlayField { columns: 32, rows: 24 };

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.x < self.columns && c.y >= 0 && c.y < self.rows
    }
}

impl Default for PlayField {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_and_players_block() {
        assert_eq!(on_contact(EntityKind::Wall), Contact::Blocked);
        assert_eq!(on_contact(EntityKind::Player), Contact::Blocked);
    }

    #[test]
    fn pickups_are_consumed() {
        assert_eq!(on_contact(EntityKind::Treasure), Contact::Pickup(Pickup::Treasure));
        assert_eq!(on_contact(EntityKind::Bomb), Contact::Pickup(Pickup::Bomb));
        assert_eq!(on_contact(EntityKind::Candy), Contact::Pickup(Pickup::Candy));
    }

    #[test]
    fn pickup_effects() {
        let t = Pickup::Treasure.effect();
        assert_eq!((t.score, t.lives, t.treasures, t.bombs), (10, 0, -1, 0));
        let b = Pickup::Bomb.effect();
        assert_eq!((b.score, b.lives, b.treasures, b.bombs), (-10, -1, 0, 1));
        let c = Pickup::Candy.effect();
        assert_eq!((c.score, c.lives, c.treasures, c.bombs), (0, 1, 0, 0));
    }

    #[test]
    fn lives_clamp() {
        assert_eq!(adjust_lives(3, 1), 3);
        assert_eq!(adjust_lives(2, 1), 3);
        assert_eq!(adjust_lives(1, -1), 0);
        assert_eq!(adjust_lives(0, -1), 0);
    }

    #[test]
    fn play_field_bounds() {
        let f = PlayField { columns: 4, rows: 2 };
        assert!(f.contains(Coord::new(0, 0)));
        assert!(f.contains(Coord::new(3, 1)));
        assert!(!f.contains(Coord::new(4, 0)));
        assert!(!f.contains(Coord::new(0, 2)));
        assert!(!f.contains(Coord::new(-1, 0)));
        assert!(!f.contains(Coord::new(0, -1)));
    }
}
