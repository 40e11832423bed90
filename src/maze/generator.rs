//! Maze generation using a randomized depth-first backtracker.
//!
//! The carver works on a doubled lattice: from the current cell it looks two
//! cells away along each axis, and when it advances it also opens the cell in
//! between. Starting from the centre of an odd-sized grid this yields a
//! spanning tree of corridors one cell wide, separated by walls one cell
//! thick.
//!
//! # Examples
//!
//! ```ignore
//! use rand::thread_rng;
//!
//! let grid = MazeGenerator::new(21, 21).carve(&mut thread_rng());
//! assert!(grid.is_passable(grid.start()));
//! ```

use super::Dice;
use super::grid::{Cell, Grid};
use super::shuffle;

/// Candidate directions, probed in this order before the shuffle.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Carves a perfect maze into a fresh [`Grid`].
#[derive(Debug, Clone, Copy)]
pub struct MazeGenerator {
    rows: usize,
    cols: usize,
}

impl MazeGenerator {
    /// Dimensions are expected to be odd and at least 3; `GameConfig::validate`
    /// enforces that before a session ever reaches the carver.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Runs the backtracker to completion and returns the carved grid.
    pub fn carve(&self, dice: &mut impl Dice) -> Grid {
        let mut grid = Grid::new(self.rows, self.cols);
        let start = grid.start();
        grid.open(start);
        let mut stack = vec![start];

        while let Some(&current) = stack.last() {
            let mut candidates: Vec<(Cell, Cell)> = DIRECTIONS
                .iter()
                .filter_map(|&(dr, dc)| {
                    let next = current.offset(dr * 2, dc * 2)?;
                    let between = current.offset(dr, dc)?;
                    (grid.contains(next) && !grid.is_passable(next)).then_some((next, between))
                })
                .collect();

            if candidates.is_empty() {
                stack.pop();
                continue;
            }

            shuffle(dice, &mut candidates);
            let (next, between) = candidates[0];
            grid.open(between);
            grid.open(next);
            stack.push(next);
        }

        grid
    }
}
