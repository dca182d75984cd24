#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The reusable per-size solving engine.
//!
//! An [`Engine`] is built once for a side length and then solves any number of
//! grids of that size. Construction precomputes three coordinate lookup tables
//! (flat cell index to row, column and box), a box membership table for unit
//! scans, and the full-candidate mask with the low `side` bits set. All of
//! this is immutable after construction, so a single engine may be shared
//! freely across threads; each [`Engine::solve`] call allocates its own
//! working state and never touches the engine itself.
//!
//! The engine is generic over the [`MaskWord`] used for value bit sets. The
//! word width is a hard capability ceiling on the side length, surfaced as
//! [`EngineError::SideTooLarge`] rather than silently truncated: `u32`
//! admits sides up to 25 and `u64` up to 49, the largest perfect squares not
//! exceeding the respective widths.

use crate::puzzle::grid::Grid;
use crate::solver::mask::MaskWord;
use crate::solver::search::SearchStats;
use std::fmt::Display;

/// An error rejecting an unsupported side length at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The side length was zero.
    ZeroSide,
    /// The side length exceeds the mask word's bit width.
    SideTooLarge {
        /// The requested side length.
        side: usize,
        /// The width of the selected mask word.
        bits: u32,
    },
    /// The side length has no integer square root, so cells cannot divide
    /// into square regions.
    NotSquareSide {
        /// The requested side length.
        side: usize,
    },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroSide => write!(f, "side length must be at least 1"),
            Self::SideTooLarge { side, bits } => {
                write!(f, "side length {side} exceeds the {bits}-bit mask capacity")
            }
            Self::NotSquareSide { side } => write!(
                f,
                "side length {side} has no integer square root, so the grid cannot form square regions"
            ),
        }
    }
}

impl std::error::Error for EngineError {}

/// A solving engine for grids of one fixed side length.
///
/// Everything inside is write-once at construction and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Engine<M: MaskWord = u32> {
    pub(crate) side: usize,
    pub(crate) region: usize,
    /// Row index of each flat cell index.
    pub(crate) row_of: Vec<u8>,
    /// Column index of each flat cell index.
    pub(crate) col_of: Vec<u8>,
    /// Box index of each flat cell index.
    pub(crate) box_of: Vec<u8>,
    /// Flat cell index of each (box, slot) pair, stored `box * side + slot`.
    pub(crate) box_cells: Vec<u16>,
    /// The low `side` bits: every value still a candidate.
    pub(crate) full_mask: M,
}

impl<M: MaskWord> Engine<M> {
    /// Builds an engine for grids of the given side length.
    ///
    /// # Errors
    ///
    /// [`EngineError::ZeroSide`] for side 0, [`EngineError::SideTooLarge`]
    /// when the side exceeds the mask word width, and
    /// [`EngineError::NotSquareSide`] when the side is not a perfect square.
    /// The shape check is separate from the capacity check: side 6 fails the
    /// former under every word width, side 49 fails the latter only for
    /// `u32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(side: usize) -> Result<Self, EngineError> {
        if side == 0 {
            return Err(EngineError::ZeroSide);
        }
        if side > M::BITS as usize {
            return Err(EngineError::SideTooLarge { side, bits: M::BITS });
        }
        let region = side.isqrt();
        if region * region != side {
            return Err(EngineError::NotSquareSide { side });
        }

        let cell_count = side * side;
        let mut row_of = vec![0u8; cell_count];
        let mut col_of = vec![0u8; cell_count];
        let mut box_of = vec![0u8; cell_count];
        let mut box_cells = vec![0u16; cell_count];

        for index in 0..cell_count {
            let row = index / side;
            let col = index % side;
            let box_index = (row / region) * region + col / region;
            let slot = (row % region) * region + (col % region);

            row_of[index] = row as u8;
            col_of[index] = col as u8;
            box_of[index] = box_index as u8;
            box_cells[box_index * side + slot] = index as u16;
        }

        Ok(Self {
            side,
            region,
            row_of,
            col_of,
            box_of,
            box_cells,
            full_mask: M::low_bits(side as u32),
        })
    }

    /// The side length this engine was built for.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// The region side length; `region² == side`.
    #[must_use]
    pub const fn region(&self) -> usize {
        self.region
    }

    /// Solves the grid in place.
    ///
    /// Returns `true` when a consistent assignment was found, in which case
    /// the grid holds it. Returns `false` when the givens already conflict or
    /// no completion exists; every cell that was empty at entry is then empty
    /// again, and given cells are never touched either way.
    ///
    /// # Panics
    ///
    /// If the grid's side length does not match the engine's.
    pub fn solve(&self, grid: &mut Grid) -> bool {
        self.solve_with_stats(grid).0
    }

    /// Solves the grid in place, returning search counters alongside the
    /// outcome. See [`Engine::solve`].
    ///
    /// # Panics
    ///
    /// If the grid's side length does not match the engine's.
    pub fn solve_with_stats(&self, grid: &mut Grid) -> (bool, SearchStats) {
        assert_eq!(
            grid.side(),
            self.side,
            "grid side does not match engine side"
        );

        let Some(mut state) = self.init_state(grid) else {
            return (false, SearchStats::default());
        };

        let open_len = state.open.len();
        let solved = self.search(grid, &mut state, open_len);
        (solved, state.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_side() {
        assert_eq!(Engine::<u32>::new(0).unwrap_err(), EngineError::ZeroSide);
    }

    #[test]
    fn test_rejects_non_square_side_regardless_of_width() {
        assert_eq!(
            Engine::<u32>::new(6).unwrap_err(),
            EngineError::NotSquareSide { side: 6 }
        );
        assert_eq!(
            Engine::<u64>::new(6).unwrap_err(),
            EngineError::NotSquareSide { side: 6 }
        );
    }

    #[test]
    fn test_capacity_depends_on_mask_width() {
        assert_eq!(
            Engine::<u32>::new(49).unwrap_err(),
            EngineError::SideTooLarge { side: 49, bits: 32 }
        );
        assert!(Engine::<u64>::new(49).is_ok());
    }

    #[test]
    fn test_accepts_supported_sides() {
        for side in [1, 4, 9, 16, 25] {
            assert!(Engine::<u32>::new(side).is_ok(), "side {side}");
        }
        assert!(Engine::<u64>::new(36).is_ok());
    }

    #[test]
    fn test_lookup_tables() {
        let engine = Engine::<u32>::new(9).unwrap();
        // Centre cell of a 9×9 grid sits in row 4, column 4, box 4.
        assert_eq!(engine.row_of[40], 4);
        assert_eq!(engine.col_of[40], 4);
        assert_eq!(engine.box_of[40], 4);

        let top_left_box: Vec<u16> = engine.box_cells[0..9].to_vec();
        assert_eq!(top_left_box, vec![0, 1, 2, 9, 10, 11, 18, 19, 20]);
    }

    #[test]
    fn test_full_mask_matches_side() {
        let engine = Engine::<u32>::new(9).unwrap();
        assert_eq!(engine.full_mask, 0b1_1111_1111);
        let wide = Engine::<u64>::new(49).unwrap();
        assert_eq!(wide.full_mask, (1 << 49) - 1);
    }

    #[test]
    #[should_panic(expected = "grid side does not match engine side")]
    fn test_solve_rejects_mismatched_grid() {
        use crate::puzzle::grid::{EXAMPLE_FOUR, Grid};
        let engine = Engine::<u32>::new(9).unwrap();
        let mut grid: Grid = EXAMPLE_FOUR.parse().unwrap();
        engine.solve(&mut grid);
    }
}
