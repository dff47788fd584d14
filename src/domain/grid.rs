/// Character grid read from a map file.
///
/// ## Map format
///   ```
///   32, 24
///   <reserved header lines, ignored>
///   -
///   wwwwwwww
///   w * @  w
///   wwwwwwww
///   ```
///
/// Line 1 declares `width, height`. A line holding only `-` starts the row
/// data; every following line is one row, left to right. Rows may be shorter
/// than `width` and there may be fewer rows than `height`: missing cells read
/// as `' '`.

use std::fmt;

use thiserror::Error;

use super::coord::Coord;

/// Symbol returned for cells with no map data.
pub const EMPTY: char = ' ';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("map header must be `<width>, <height>`, found {line:?}")]
    HeaderMalformed { line: String },
    #[error("map has no line holding a single `-` before the row data")]
    MissingSeparator,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
pub struct OutOfRange {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    rows: Vec<Vec<char>>,
}

impl GridMap {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let lines: Vec<&str> = text.lines().collect();
        let (width, height) = parse_header(lines.first().copied().unwrap_or(""))?;

        let start = lines
            .iter()
            .skip(1)
            .position(|l| l.trim_end() == "-")
            .map(|i| i + 2)
            .ok_or(ParseError::MissingSeparator)?;

        let rows = lines[start..].iter().map(|l| l.chars().collect()).collect();

        Ok(GridMap { width, height, rows })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Symbol at (x, y). Cells past the parsed data are `EMPTY`.
    pub fn get(&self, x: i32, y: i32) -> Result<char, OutOfRange> {
        let in_range = x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height;
        if !in_range {
            return Err(OutOfRange { x, y, width: self.width, height: self.height });
        }
        let ch = self
            .rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(EMPTY);
        Ok(ch)
    }

    /// Every cell of the declared grid, row-major (y outer, x inner).
    pub fn cells(&self) -> Cells<'_> {
        Cells { map: self, next: 0 }
    }
}

/// Each token is an integer. Negative values give an empty axis. Dimensions
/// must fit in `i32` and their product in `usize`, so every cell has an
/// exact coordinate.
fn parse_header(line: &str) -> Result<(usize, usize), ParseError> {
    let malformed = || ParseError::HeaderMalformed { line: line.to_string() };
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != 2 {
        return Err(malformed());
    }
    let dimension = |token: &str| -> Result<usize, ParseError> {
        let n = token.trim().parse::<i64>().map_err(|_| malformed())?;
        let n = i32::try_from(n.max(0)).map_err(|_| malformed())?;
        usize::try_from(n).map_err(|_| malformed())
    };
    let width = dimension(parts[0])?;
    let height = dimension(parts[1])?;
    width.checked_mul(height).ok_or_else(malformed)?;
    Ok((width, height))
}

/// Row-major cell iterator returned by [`GridMap::cells`].
pub struct Cells<'a> {
    map: &'a GridMap,
    next: usize,
}

impl Iterator for Cells<'_> {
    type Item = (Coord, char);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.map.width * self.map.height {
            return None;
        }
        let x = (self.next % self.map.width) as i32;
        let y = (self.next / self.map.width) as i32;
        self.next += 1;
        let ch = self.map.get(x, y).unwrap_or(EMPTY);
        Some((Coord::new(x, y), ch))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.map.width * self.map.height).saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Cells<'_> {}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width {
                write!(f, "{}", self.get(x as i32, y as i32).unwrap_or(EMPTY))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "4, 3\nreserved\n-\nw*@\n  b c\n";

    #[test]
    fn parses_header_and_rows() {
        let m = GridMap::parse(SMALL).unwrap();
        assert_eq!(m.width(), 4);
        assert_eq!(m.height(), 3);
        assert_eq!(m.get(0, 0), Ok('w'));
        assert_eq!(m.get(1, 0), Ok('*'));
        assert_eq!(m.get(2, 1), Ok('b'));
    }

    #[test]
    fn header_tolerates_spaces() {
        let m = GridMap::parse("  7 ,2  \n-\n").unwrap();
        assert_eq!((m.width(), m.height()), (7, 2));
    }

    #[test]
    fn malformed_headers() {
        for text in ["", "5\n-\n", "1, 2, 3\n-\n", "a, 2\n-\n", "3, 1.5\n-\n"] {
            assert!(
                matches!(GridMap::parse(text), Err(ParseError::HeaderMalformed { .. })),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn negative_dimensions_give_empty_grid() {
        let m = GridMap::parse("3, -1\n-\n*\n").unwrap();
        assert_eq!((m.width(), m.height()), (3, 0));
        assert_eq!(m.cells().count(), 0);
        assert!(m.get(0, 0).is_err());
    }

    #[test]
    fn oversized_headers_rejected() {
        for text in [
            "4294967296, 4294967296\n-\n*\n",
            "4294967297, 1\n-\n*\n",
            "2147483648, 1\n-\n*\n",
            "1, 99999999999999999999\n-\n*\n",
        ] {
            assert!(
                matches!(GridMap::parse(text), Err(ParseError::HeaderMalformed { .. })),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn widest_header_yields_each_cell_once() {
        let m = GridMap::parse("2147483647, 1\n-\n*\n").unwrap();
        let mut cells = m.cells();
        assert_eq!(cells.next(), Some((Coord::new(0, 0), '*')));
        assert_eq!(cells.len(), i32::MAX as usize - 1);
        assert_eq!(cells.next(), Some((Coord::new(1, 0), EMPTY)));
    }

    #[test]
    fn missing_separator() {
        assert_eq!(GridMap::parse("3, 3\nw w\n--\n"), Err(ParseError::MissingSeparator));
    }

    #[test]
    fn separator_allows_trailing_whitespace() {
        let m = GridMap::parse("2, 1\n-  \nww\n").unwrap();
        assert_eq!(m.get(1, 0), Ok('w'));
    }

    #[test]
    fn out_of_range_everywhere_outside() {
        let m = GridMap::parse(SMALL).unwrap();
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (4, 3), (i32::MIN, 1), (1, i32::MAX)] {
            let err = m.get(x, y).unwrap_err();
            assert_eq!((err.x, err.y), (x, y));
        }
    }

    #[test]
    fn short_and_missing_rows_read_empty() {
        let m = GridMap::parse(SMALL).unwrap();
        assert_eq!(m.get(3, 0), Ok(EMPTY)); // row 0 has three cells
        for x in 0..4 {
            assert_eq!(m.get(x, 2), Ok(EMPTY)); // row 2 absent
        }
    }

    #[test]
    fn trailing_newline_does_not_change_rows() {
        let with = GridMap::parse("3, 2\n-\nw@w\n*\n").unwrap();
        let without = GridMap::parse("3, 2\n-\nw@w\n*").unwrap();
        let crlf = GridMap::parse("3, 2\r\n-\r\nw@w\r\n*\r\n").unwrap();
        assert_eq!(with, without);
        assert_eq!(with, crlf);
    }

    #[test]
    fn cells_are_row_major_and_restartable() {
        let m = GridMap::parse("2, 2\n-\nab\ncd\n").unwrap();
        let first: Vec<_> = m.cells().collect();
        assert_eq!(
            first,
            vec![
                (Coord::new(0, 0), 'a'),
                (Coord::new(1, 0), 'b'),
                (Coord::new(0, 1), 'c'),
                (Coord::new(1, 1), 'd'),
            ]
        );
        assert_eq!(m.cells().collect::<Vec<_>>(), first);
        assert_eq!(m.cells().len(), 4);
    }

    #[test]
    fn zero_width_grid_has_no_cells() {
        let m = GridMap::parse("0, 5\n-\nwww\n").unwrap();
        assert_eq!(m.cells().count(), 0);
    }

    #[test]
    fn display_pads_to_declared_size() {
        let m = GridMap::parse("3, 2\n-\nw\n").unwrap();
        assert_eq!(m.to_string(), "w  \n   ");
    }
}
