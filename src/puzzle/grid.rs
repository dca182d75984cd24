#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A square grid of small unsigned values with validated shape.
//!
//! A grid of side N holds N² cells row-major, each in `0..=N` where 0 denotes
//! an empty cell. The side must itself be a perfect square so the grid divides
//! into N square regions of side √N. Both square roots are checked when a grid
//! is built from a flat token sequence, so a 36-token input (a 6×6 grid whose
//! regions would have side √6) is rejected at construction.
//!
//! The textual form is one character per cell: `'0'` for empty, `'1'..'9'` for
//! values 1..9 and `'A'..'Z'` (case-insensitive) for values 10..35. Whitespace
//! is ignored.

use itertools::Itertools;
use std::fmt::Display;
use std::str::FromStr;

/// A 9×9 puzzle with a unique solution, suitable for tests and benchmarks.
pub const EXAMPLE_NINE: &str =
    "070000043040009610800634900094052000358460020000800530080070091902100005007040802";

/// The unique solution of [`EXAMPLE_NINE`].
pub const EXAMPLE_NINE_SOLVED: &str =
    "679518243543729618821634957794352186358461729216897534485276391962183475137945862";

/// A 4×4 puzzle, small enough to trace by hand.
pub const EXAMPLE_FOUR: &str = "1030041020430301";

/// A 16×16 puzzle with a single given: the value 16, written as `'G'`.
pub const EXAMPLE_SIXTEEN: &str = concat!(
    "G000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
    "0000000000000000",
);

/// An error produced while building a grid from a flat token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The token count has no integer square root, or its square root has
    /// none, so the cells cannot form a square grid of square regions.
    BadLength {
        /// Number of tokens found.
        len: usize,
    },
    /// A character outside the recognised token set.
    BadToken {
        /// The offending character.
        token: char,
        /// Its zero-based position among the non-whitespace tokens.
        position: usize,
    },
    /// A recognised character encoding a value larger than the grid side.
    ValueOutOfRange {
        /// The offending character.
        token: char,
        /// Its zero-based position among the non-whitespace tokens.
        position: usize,
        /// The side length the input implies.
        side: usize,
    },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadLength { len } => {
                write!(f, "{len} cells do not form a square grid of square regions")
            }
            Self::BadToken { token, position } => {
                write!(f, "unrecognised character {token:?} at position {position}")
            }
            Self::ValueOutOfRange {
                token,
                position,
                side,
            } => write!(
                f,
                "character {token:?} at position {position} encodes a value above the grid side {side}"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// A square puzzle grid: fixed shape, mutable cell contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    side: usize,
    region: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// The side length N of the grid.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// The side length of each square region; `region² == side`.
    #[must_use]
    pub const fn region(&self) -> usize {
        self.region
    }

    /// The cells in row-major order; 0 denotes an empty cell.
    #[must_use]
    pub fn values(&self) -> &[u8] {
        &self.cells
    }

    /// Number of empty cells.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// The value at (`row`, `col`), 0 for empty.
    ///
    /// # Panics
    ///
    /// If `row` or `col` is outside `0..side`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(
            row < self.side && col < self.side,
            "cell ({row}, {col}) out of bounds for side {}",
            self.side
        );
        self.cells[row * self.side + col]
    }

    /// Writes `value` at (`row`, `col`); 0 clears the cell.
    ///
    /// # Panics
    ///
    /// If `row` or `col` is outside `0..side`, or `value` exceeds the side.
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        assert!(
            row < self.side && col < self.side,
            "cell ({row}, {col}) out of bounds for side {}",
            self.side
        );
        assert!(
            usize::from(value) <= self.side,
            "value {value} above side {}",
            self.side
        );
        self.cells[row * self.side + col] = value;
    }

    /// The canonical one-line rendering, one token per cell.
    #[must_use]
    pub fn to_line(&self) -> String {
        self.cells.iter().map(|&v| value_token(v)).collect()
    }

    pub(crate) fn at(&self, index: usize) -> u8 {
        self.cells[index]
    }

    pub(crate) fn set_at(&mut self, index: usize, value: u8) {
        self.cells[index] = value;
    }
}

impl FromStr for Grid {
    type Err = ParseError;

    /// Builds a grid from a flat token sequence, ignoring whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = s.chars().filter(|c| !c.is_whitespace()).collect_vec();
        let (side, region) =
            grid_shape(tokens.len()).ok_or(ParseError::BadLength { len: tokens.len() })?;

        let mut cells = Vec::with_capacity(tokens.len());
        for (position, &token) in tokens.iter().enumerate() {
            let value = token_value(token).ok_or(ParseError::BadToken { token, position })?;
            if usize::from(value) > side {
                return Err(ParseError::ValueOutOfRange {
                    token,
                    position,
                    side,
                });
            }
            cells.push(value);
        }

        Ok(Self {
            side,
            region,
            cells,
        })
    }
}

impl Display for Grid {
    /// Renders the grid one row per line, `'.'` for empty cells.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.side {
            for col in 0..self.side {
                if col > 0 {
                    write!(f, " ")?;
                }
                let value = self.cells[row * self.side + col];
                if value == 0 {
                    write!(f, ".")?;
                } else {
                    write!(f, "{}", value_token(value))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Decodes a token character: `'0'` is empty, `'1'..'9'` and `'A'..'Z'`
/// (either case) are values 1..35.
#[must_use]
pub const fn token_value(token: char) -> Option<u8> {
    match token {
        '0'..='9' => Some(token as u8 - b'0'),
        'a'..='z' => Some(token as u8 - b'a' + 10),
        'A'..='Z' => Some(token as u8 - b'A' + 10),
        _ => None,
    }
}

/// Encodes a value as its token character; values above 35 have no token
/// and render as `'?'`.
#[must_use]
pub const fn value_token(value: u8) -> char {
    match value {
        0..=9 => (b'0' + value) as char,
        10..=35 => (b'A' + value - 10) as char,
        _ => '?',
    }
}

/// The (side, region) pair implied by a flat cell count, if the count is a
/// perfect square whose square root is itself a perfect square.
#[must_use]
pub fn grid_shape(len: usize) -> Option<(usize, usize)> {
    let side = exact_sqrt(len)?;
    let region = exact_sqrt(side)?;
    Some((side, region))
}

fn exact_sqrt(n: usize) -> Option<usize> {
    let root = n.isqrt();
    (root * root == n).then_some(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_example_nine() {
        let grid: Grid = EXAMPLE_NINE.parse().unwrap();
        assert_eq!(grid.side(), 9);
        assert_eq!(grid.region(), 3);
        assert_eq!(grid.values().len(), 81);
        assert_eq!(grid.get(0, 1), 7);
        assert_eq!(grid.get(8, 8), 2);
        assert_eq!(grid.empty_count(), 44);
    }

    #[test]
    fn test_parse_ignores_whitespace() {
        let grid: Grid = "1030\n0410\n2043\n0301".parse().unwrap();
        assert_eq!(grid.side(), 4);
        assert_eq!(grid.to_line(), "1030041020430301");
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        let err = "0".repeat(80).parse::<Grid>().unwrap_err();
        assert_eq!(err, ParseError::BadLength { len: 80 });
    }

    #[test]
    fn test_parse_rejects_six_by_six() {
        // 36 cells give side 6, but 6 has no integer square root.
        let err = "0".repeat(36).parse::<Grid>().unwrap_err();
        assert_eq!(err, ParseError::BadLength { len: 36 });
    }

    #[test]
    fn test_parse_rejects_unknown_token() {
        let input = format!("00.0{}", "0".repeat(77));
        let err = input.parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            ParseError::BadToken {
                token: '.',
                position: 2
            }
        );
    }

    #[test]
    fn test_parse_rejects_value_above_side() {
        let input = format!("{}G", "0".repeat(80));
        let err = input.parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            ParseError::ValueOutOfRange {
                token: 'G',
                position: 80,
                side: 9
            }
        );
    }

    #[test]
    fn test_parse_letter_tokens_case_insensitive() {
        let upper: Grid = EXAMPLE_SIXTEEN.parse().unwrap();
        let lower: Grid = EXAMPLE_SIXTEEN.to_lowercase().parse().unwrap();
        assert_eq!(upper.side(), 16);
        assert_eq!(upper.get(0, 0), 16);
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid: Grid = EXAMPLE_FOUR.parse().unwrap();
        assert_eq!(grid.get(0, 0), 1);
        grid.set(0, 1, 2);
        assert_eq!(grid.get(0, 1), 2);
        grid.set(0, 1, 0);
        assert_eq!(grid.get(0, 1), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds() {
        let grid: Grid = EXAMPLE_FOUR.parse().unwrap();
        let _ = grid.get(4, 0);
    }

    #[test]
    #[should_panic(expected = "above side")]
    fn test_set_value_above_side() {
        let mut grid: Grid = EXAMPLE_FOUR.parse().unwrap();
        grid.set(0, 0, 5);
    }

    #[test]
    fn test_to_line_round_trip() {
        let grid: Grid = EXAMPLE_NINE.parse().unwrap();
        assert_eq!(grid.to_line(), EXAMPLE_NINE);
        assert_eq!(grid.to_line().parse::<Grid>().unwrap(), grid);
    }

    #[test]
    fn test_display_marks_empty_cells() {
        let grid: Grid = EXAMPLE_FOUR.parse().unwrap();
        let rendered = grid.to_string();
        assert_eq!(rendered.lines().next(), Some("1 . 3 ."));
        assert_eq!(rendered.lines().count(), 4);
    }

    #[test]
    fn test_token_value_boundaries() {
        assert_eq!(token_value('0'), Some(0));
        assert_eq!(token_value('9'), Some(9));
        assert_eq!(token_value('A'), Some(10));
        assert_eq!(token_value('g'), Some(16));
        assert_eq!(token_value('Z'), Some(35));
        assert_eq!(token_value('@'), None);
    }

    #[test]
    fn test_single_cell_grid() {
        let grid: Grid = "0".parse().unwrap();
        assert_eq!(grid.side(), 1);
        assert_eq!(grid.region(), 1);
    }
}
