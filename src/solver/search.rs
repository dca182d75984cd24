#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Per-solve working state and the recursive backtracking search.
//!
//! Each [`Engine::solve`](crate::solver::engine::Engine::solve) call owns a
//! fresh [`SearchState`]: one used-value mask per row, column and box, plus
//! the list of open cell indices. The list is treated as an active range that
//! shrinks by one swap per committed cell and is swapped back when a branch is
//! exhausted, so the search allocates nothing per guess and concurrent solves
//! share nothing mutable.
//!
//! Cell selection runs two heuristics per call:
//!
//! 1. A minimum-remaining-values scan over the active range. A cell with no
//!    candidates fails the branch immediately; a cell with exactly one (a
//!    naked single) ends the scan early, since nothing can beat it.
//! 2. When the best cell still has several candidates, a hidden-single scan
//!    walks every row, column and box tracking which values appear as a
//!    candidate in exactly one open cell of that unit. Such a value is forced
//!    even though its cell may have other candidates, so it overrides the
//!    minimum-candidates pick.
//!
//! Candidate values are tried lowest bit first; among equal candidate counts
//! the first cell in scan order wins, which keeps the exploration order
//! deterministic.

use crate::puzzle::grid::Grid;
use crate::solver::engine::Engine;
use crate::solver::mask::MaskWord;
use smallvec::{SmallVec, smallvec};

/// Counters collected over one solve call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Values tentatively placed during the search.
    pub decisions: usize,
    /// Placements undone after a failed branch.
    pub backtracks: usize,
    /// Times the cell scan stopped early on a single-candidate cell.
    pub naked_singles: usize,
    /// Times a unit scan forced a value over the minimum-candidates pick.
    pub hidden_singles: usize,
}

/// Inline capacity for the per-unit mask vectors; covers every supported side.
const UNIT_INLINE: usize = 49;

/// Inline capacity for the open-cell list; covers the classic 9×9 grid
/// without spilling.
const CELL_INLINE: usize = 81;

/// Mutable state scoped to a single solve call.
pub(crate) struct SearchState<M: MaskWord> {
    pub(crate) row_used: SmallVec<[M; UNIT_INLINE]>,
    pub(crate) col_used: SmallVec<[M; UNIT_INLINE]>,
    pub(crate) box_used: SmallVec<[M; UNIT_INLINE]>,
    /// Flat indices of still-empty cells; `open[..k]` is the active range.
    pub(crate) open: SmallVec<[u16; CELL_INLINE]>,
    pub(crate) stats: SearchStats,
}

impl<M: MaskWord> Engine<M> {
    /// Builds the working state for a grid: collects open cells and registers
    /// every given in its three unit masks. Returns `None` when two givens
    /// collide in a unit, in which case no search is worth starting.
    pub(crate) fn init_state(&self, grid: &Grid) -> Option<SearchState<M>> {
        let mut state = SearchState {
            row_used: smallvec![M::EMPTY; self.side],
            col_used: smallvec![M::EMPTY; self.side],
            box_used: smallvec![M::EMPTY; self.side],
            open: SmallVec::new(),
            stats: SearchStats::default(),
        };

        for (index, &value) in grid.values().iter().enumerate() {
            if value == 0 {
                #[allow(clippy::cast_possible_truncation)]
                state.open.push(index as u16);
                continue;
            }

            let bit = M::bit(u32::from(value) - 1);
            let row = usize::from(self.row_of[index]);
            let col = usize::from(self.col_of[index]);
            let box_index = usize::from(self.box_of[index]);

            let used = state.row_used[row] | state.col_used[col] | state.box_used[box_index];
            if !(used & bit).is_empty() {
                return None;
            }
            state.row_used[row] |= bit;
            state.col_used[col] |= bit;
            state.box_used[box_index] |= bit;
        }

        Some(state)
    }

    /// Recursively fills the active range `open[..open_len]`.
    ///
    /// On `true` the grid holds a full assignment and the unit masks match
    /// it. On `false` the grid, the unit masks and the order of the active
    /// range are exactly as they were at entry.
    pub(crate) fn search(
        &self,
        grid: &mut Grid,
        state: &mut SearchState<M>,
        open_len: usize,
    ) -> bool {
        if open_len == 0 {
            return true;
        }

        let Some((slot, mask)) = self.pick_cell(grid, state, open_len) else {
            return false;
        };

        // Move the chosen cell out of the active range; one swap, no shift.
        let last = open_len - 1;
        state.open.swap(slot, last);
        let cell = usize::from(state.open[last]);
        let row = usize::from(self.row_of[cell]);
        let col = usize::from(self.col_of[cell]);
        let box_index = usize::from(self.box_of[cell]);

        let mut rest = mask;
        while !rest.is_empty() {
            let index = rest.lowest();
            let bit = M::bit(index);
            #[allow(clippy::cast_possible_truncation)]
            let value = (index + 1) as u8;

            grid.set_at(cell, value);
            state.row_used[row] |= bit;
            state.col_used[col] |= bit;
            state.box_used[box_index] |= bit;
            state.stats.decisions += 1;

            if self.search(grid, state, last) {
                return true;
            }

            grid.set_at(cell, 0);
            state.row_used[row] &= !bit;
            state.col_used[col] &= !bit;
            state.box_used[box_index] &= !bit;
            state.stats.backtracks += 1;

            rest = rest.clear_lowest();
        }

        // Every candidate failed; put the cell back where the caller saw it.
        state.open.swap(slot, last);
        false
    }

    /// Picks the next cell to branch on and the candidate values to try,
    /// returning its slot in the active range. `None` means some open cell
    /// has no candidates and the branch is dead.
    fn pick_cell(
        &self,
        grid: &Grid,
        state: &mut SearchState<M>,
        open_len: usize,
    ) -> Option<(usize, M)> {
        let mut best_slot = 0;
        let mut best_mask = M::EMPTY;
        let mut best_count = u32::MAX;

        for slot in 0..open_len {
            let cell = usize::from(state.open[slot]);
            let mask = self.candidates(state, cell);
            let count = mask.count();
            if count == 0 {
                return None;
            }
            if count < best_count {
                best_slot = slot;
                best_mask = mask;
                best_count = count;
                if count == 1 {
                    state.stats.naked_singles += 1;
                    return Some((slot, mask));
                }
            }
        }

        if let Some((cell, bit)) = self.hidden_single(grid, state) {
            if let Some(slot) = state.open[..open_len]
                .iter()
                .position(|&i| usize::from(i) == cell)
            {
                state.stats.hidden_singles += 1;
                return Some((slot, bit));
            }
        }

        Some((best_slot, best_mask))
    }

    /// The candidate mask of an open cell: values unused in its row, column
    /// and box.
    fn candidates(&self, state: &SearchState<M>, cell: usize) -> M {
        let used = state.row_used[usize::from(self.row_of[cell])]
            | state.col_used[usize::from(self.col_of[cell])]
            | state.box_used[usize::from(self.box_of[cell])];
        !used & self.full_mask
    }

    /// Scans every row, then column, then box for a value that is a candidate
    /// in exactly one open cell of the unit. Returns that cell and the value
    /// bit, or `None` when no unit forces anything.
    pub(crate) fn hidden_single(&self, grid: &Grid, state: &SearchState<M>) -> Option<(usize, M)> {
        let side = self.side;
        for row in 0..side {
            if let Some(found) = self.hidden_in_unit(grid, state, |slot| row * side + slot) {
                return Some(found);
            }
        }
        for col in 0..side {
            if let Some(found) = self.hidden_in_unit(grid, state, |slot| slot * side + col) {
                return Some(found);
            }
        }
        for box_index in 0..side {
            if let Some(found) = self.hidden_in_unit(grid, state, |slot| {
                usize::from(self.box_cells[box_index * side + slot])
            }) {
                return Some(found);
            }
        }
        None
    }

    /// Hidden-single scan of one unit whose member cells are produced by
    /// `cell_at`. `seen_once` accumulates values seen as a candidate at all,
    /// `seen_twice` those seen in two or more cells; their difference is the
    /// set of values forced into a single cell.
    fn hidden_in_unit(
        &self,
        grid: &Grid,
        state: &SearchState<M>,
        cell_at: impl Fn(usize) -> usize,
    ) -> Option<(usize, M)> {
        let mut seen_once = M::EMPTY;
        let mut seen_twice = M::EMPTY;

        for slot in 0..self.side {
            let cell = cell_at(slot);
            if grid.at(cell) != 0 {
                continue;
            }
            let mask = self.candidates(state, cell);
            seen_twice |= seen_once & mask;
            seen_once |= mask;
        }

        let hidden = seen_once & !seen_twice;
        if hidden.is_empty() {
            return None;
        }

        let bit = M::bit(hidden.lowest());
        for slot in 0..self.side {
            let cell = cell_at(slot);
            if grid.at(cell) != 0 {
                continue;
            }
            if !(self.candidates(state, cell) & bit).is_empty() {
                return Some((cell, bit));
            }
        }
        None
    }
}
