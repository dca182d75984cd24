#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! This module provides the grid representation for square puzzles.

/// The `grid` module contains the grid type, token parsing and rendering.
pub mod grid;
