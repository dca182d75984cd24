#![deny(missing_docs)]
//! This crate provides a solving engine for Sudoku puzzles and their N²×N² generalisations.

/// The `puzzle` module implements the grid representation: validated construction,
/// character-token parsing and rendering.
pub mod puzzle;

/// The `solver` module implements the solving engine: bitmask constraint tracking,
/// heuristic cell selection and recursive backtracking search.
pub mod solver;
