/// Render-ready snapshot of a session, handed to the frontend once per frame.
///
/// Sprites carry pixel rectangles: `grid coord × cell_size + offset`.
/// The offset is a scrolling hook and is currently always (0, 0).

use crate::domain::coord::Coord;
use crate::domain::entity::{EntityKind, Rgb};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Viewport {
    pub cell_size: u32,
    pub offset: (i32, i32),
}

impl Viewport {
    pub fn new(cell_size: u32) -> Self {
        Viewport { cell_size: cell_size.max(1), offset: (0, 0) }
    }

    pub fn rect_for(&self, c: Coord) -> Rect {
        let size = self.cell_size as i32;
        Rect {
            x: c.x * size + self.offset.0,
            y: c.y * size + self.offset.1,
            w: self.cell_size,
            h: self.cell_size,
        }
    }

    /// Inverse of `rect_for` for a rectangle's top-left corner.
    pub fn cell_of(&self, r: &Rect) -> Coord {
        let size = self.cell_size as i32;
        Coord::new(
            (r.x - self.offset.0).div_euclid(size),
            (r.y - self.offset.1).div_euclid(size),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(25)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sprite {
    pub kind: EntityKind,
    pub color: Rgb,
    pub rect: Rect,
}

/// Which level a session is playing, for the HUD.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LevelInfo {
    pub name: String,
    /// 1-based position in the sequence.
    pub number: usize,
    pub count: usize,
}

#[derive(Clone, Debug)]
pub struct FrameView {
    pub sprites: Vec<Sprite>,
    pub viewport: Viewport,
    pub field_columns: i32,
    pub field_rows: i32,
    pub score: i64,
    pub lives: u8,
    pub treasures_left: usize,
    pub level: LevelInfo,
    pub frame: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_scales_by_cell_size() {
        let v = Viewport::new(25);
        assert_eq!(v.rect_for(Coord::new(3, 2)), Rect { x: 75, y: 50, w: 25, h: 25 });
    }

    #[test]
    fn offset_shifts_uniformly() {
        let v = Viewport { cell_size: 10, offset: (5, -5) };
        let r = v.rect_for(Coord::new(1, 1));
        assert_eq!((r.x, r.y), (15, 5));
        assert_eq!(v.cell_of(&r), Coord::new(1, 1));
    }

    #[test]
    fn zero_cell_size_is_raised() {
        assert_eq!(Viewport::new(0).cell_size, 1);
    }
}
