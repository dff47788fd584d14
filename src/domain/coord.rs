/// Grid-space coordinates and the four unit steps.

use std::fmt;
use std::ops::Add;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement direction (continuous while key held).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Order in which held directions are applied within one eligible frame.
    pub const POLL_ORDER: [Direction; 4] =
        [Direction::Down, Direction::Up, Direction::Right, Direction::Left];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl Add<Direction> for Coord {
    type Output = Coord;

    fn add(self, dir: Direction) -> Coord {
        let (dx, dy) = dir.delta();
        Coord::new(self.x + dx, self.y + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_in_each_direction() {
        let c = Coord::new(3, 3);
        assert_eq!(c + Direction::Up, Coord::new(3, 2));
        assert_eq!(c + Direction::Down, Coord::new(3, 4));
        assert_eq!(c + Direction::Left, Coord::new(2, 3));
        assert_eq!(c + Direction::Right, Coord::new(4, 3));
    }

    #[test]
    fn step_off_the_origin_goes_negative() {
        assert_eq!(Coord::new(0, 0) + Direction::Left, Coord::new(-1, 0));
    }
}
