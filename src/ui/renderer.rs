/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Layout:
///   ┌──────────────────────────────┐
///   │ play field, 2 cols per cell  │  rows 0..field_rows
///   │                              │
///   │ ...                          │
///   │ HUD                          │  last terminal row
///   └──────────────────────────────┘

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{EntityKind, Rgb};
use crate::sim::view::FrameView;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, used for
    /// `Clear` as well so row gaps match the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    /// Inside the play field, so its bounds stay visible.
    const FIELD_BG: Color = Color::Rgb { r: 12, g: 12, b: 18 };

    const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Text of one row, trailing blanks trimmed.
    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        let s: String = (0..self.width).map(|x| self.get(x, y).ch).collect();
        s.trim_end().to_string()
    }
}

// ── Sprites ──

/// Each grid cell is two terminal columns wide so cells look square.
const CELL_W: usize = 2;

fn glyph(kind: EntityKind) -> [char; 2] {
    match kind {
        EntityKind::Wall => ['█', '█'],
        EntityKind::Treasure => ['◆', ' '],
        EntityKind::Bomb => ['●', ' '],
        EntityKind::Candy => ['♥', ' '],
        EntityKind::Player => ['☺', ' '],
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.0, g: rgb.1, b: rgb.2 }
}

/// The between-level and end-of-game screens.
#[derive(Clone, Copy, Debug)]
pub enum Screen<'a> {
    LevelCleared(&'a FrameView),
    GameOver(&'a FrameView),
    Victory { score: i64 },
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.set_size(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn set_size(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.set_size(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn render(&mut self, view: &FrameView) -> io::Result<()> {
        self.sync_size()?;
        self.front.clear();
        self.compose_game(view);
        self.present()
    }

    pub fn render_screen(&mut self, screen: Screen<'_>) -> io::Result<()> {
        self.sync_size()?;
        self.front.clear();
        self.compose_screen(screen);
        self.present()
    }

    fn present(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, v: &FrameView) {
        let hud_row = self.term_h.saturating_sub(1);

        // Field background, clipped to the rows above the HUD.
        let rows = (v.field_rows.max(0) as usize).min(hud_row);
        let cols = (v.field_columns.max(0) as usize * CELL_W).min(self.term_w);
        for y in 0..rows {
            for x in 0..cols {
                self.front.set(x, y, Cell::new(' ', Color::White, Cell::FIELD_BG));
            }
        }

        for sprite in &v.sprites {
            let at = v.viewport.cell_of(&sprite.rect);
            if at.x < 0 || at.y < 0 {
                continue;
            }
            let (col, row) = (at.x as usize * CELL_W, at.y as usize);
            if row >= rows {
                continue;
            }
            let fg = color(sprite.color);
            for (i, ch) in glyph(sprite.kind).into_iter().enumerate() {
                if col + i < cols {
                    self.front.set(col + i, row, Cell::new(ch, fg, Cell::FIELD_BG));
                }
            }
        }

        // ── HUD row ──
        let hud = format!(
            " {}  Level {}/{}  Score:{:<6}  Lives:{}  Treasure left:{}   [Esc] quit",
            v.level.name, v.level.number, v.level.count, v.score, v.lives, v.treasures_left,
        );
        self.front.fill_row(hud_row, Cell::HUD_BG);
        self.front.put_str(0, hud_row, &hud, Color::White, Cell::HUD_BG);
    }

    fn compose_screen(&mut self, screen: Screen<'_>) {
        let (title, accent, lines) = match screen {
            Screen::LevelCleared(v) => (
                "LEVEL CLEARED",
                Color::Rgb { r: 80, g: 255, b: 80 },
                vec![
                    format!("{}  ({}/{})", v.level.name, v.level.number, v.level.count),
                    format!("Score: {}   Lives: {}", v.score, v.lives),
                ],
            ),
            Screen::GameOver(v) => (
                "GAME OVER",
                Color::Rgb { r: 255, g: 60, b: 60 },
                vec![
                    format!("Final Score: {}", v.score),
                    format!("Reached level {} of {}", v.level.number, v.level.count),
                ],
            ),
            Screen::Victory { score } => (
                "ALL LEVELS CLEARED",
                Color::Rgb { r: 255, g: 220, b: 50 },
                vec![format!("Final Score: {score}")],
            ),
        };

        let inner = title.len() + 8;
        let bar: String = "═".repeat(inner);
        self.front.put_str(4, 2, &format!("╔{bar}╗"), accent, Cell::BASE_BG);
        self.front.put_str(4, 3, &format!("║    {title}    ║"), accent, Cell::BASE_BG);
        self.front.put_str(4, 4, &format!("╚{bar}╝"), accent, Cell::BASE_BG);

        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(6, 6 + i, line, Color::White, Cell::BASE_BG);
        }
        self.front.put_str(6, 7 + lines.len(), "▸ ENTER / SPACE: continue", Color::DarkGrey, Cell::BASE_BG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coord::Coord;
    use crate::sim::view::{LevelInfo, Sprite, Viewport};

    fn sized(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.set_size(w, h);
        r
    }

    fn view(sprites: &[(EntityKind, i32, i32)]) -> FrameView {
        let viewport = Viewport::new(25);
        FrameView {
            sprites: sprites
                .iter()
                .map(|&(kind, x, y)| Sprite { kind, color: kind.color(), rect: viewport.rect_for(Coord::new(x, y)) })
                .collect(),
            viewport,
            field_columns: 4,
            field_rows: 3,
            score: 20,
            lives: 2,
            treasures_left: 1,
            level: LevelInfo { name: "map_0".into(), number: 1, count: 3 },
            frame: 7,
        }
    }

    #[test]
    fn sprites_land_on_two_column_cells() {
        let mut r = sized(20, 6);
        r.compose_game(&view(&[(EntityKind::Wall, 0, 0), (EntityKind::Player, 2, 1)]));
        assert_eq!(r.front.row_text(0), "██");
        assert_eq!(r.front.row_text(1), "    ☺");
        assert_eq!(r.front.get(4, 1).fg, Color::Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn field_background_covers_field_only() {
        let mut r = sized(20, 6);
        r.compose_game(&view(&[]));
        assert_eq!(r.front.get(7, 2).bg, Cell::FIELD_BG);
        assert_eq!(r.front.get(8, 2).bg, Cell::BASE_BG);
        assert_eq!(r.front.get(0, 3).bg, Cell::BASE_BG);
    }

    #[test]
    fn hud_on_last_row() {
        let mut r = sized(80, 6);
        r.compose_game(&view(&[]));
        let hud = r.front.row_text(5);
        assert!(hud.contains("Level 1/3"), "{hud}");
        assert!(hud.contains("Score:20"), "{hud}");
        assert!(hud.contains("Lives:2"), "{hud}");
        assert!(hud.contains("Treasure left:1"), "{hud}");
    }

    #[test]
    fn sprites_clipped_above_hud() {
        let mut r = sized(20, 3);
        r.compose_game(&view(&[(EntityKind::Bomb, 0, 2)]));
        assert!(!r.front.row_text(2).contains('●'));
    }

    #[test]
    fn screens_show_score() {
        let mut r = sized(60, 12);
        r.compose_screen(Screen::Victory { score: 42 });
        assert!(r.front.row_text(3).contains("ALL LEVELS CLEARED"));
        assert!(r.front.row_text(6).contains("Final Score: 42"));

        let v = view(&[]);
        r.front.clear();
        r.compose_screen(Screen::GameOver(&v));
        assert!(r.front.row_text(3).contains("GAME OVER"));
        assert!(r.front.row_text(7).contains("level 1 of 3"));
    }
}
