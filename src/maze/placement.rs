//! Random scatter of entities into open maze cells.
//!
//! Each batch gets a fixed number of draws. A draw picks any grid cell
//! uniformly and is kept only if that cell is passable, is not the start or
//! the exit, and has not been claimed by an earlier placement. Rejected draws
//! are simply lost, so a batch can realise fewer entities than it asked for.

use super::Dice;
use super::grid::{Cell, Grid};
use std::collections::HashSet;

/// One accepted draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub cell: Cell,
    /// Jittered world-space `(x, z)` of the entity centre.
    pub position: (f32, f32),
}

/// Scatters batches into a carved grid, sharing cell occupancy across
/// batches so two entities never claim the same cell.
pub struct PlacementSampler<'a> {
    grid: &'a Grid,
    start: Cell,
    exit: Cell,
    cell_size: f32,
    occupied: HashSet<Cell>,
}

impl<'a> PlacementSampler<'a> {
    pub fn new(grid: &'a Grid, exit: Cell, cell_size: f32) -> Self {
        Self {
            grid,
            start: grid.start(),
            exit,
            cell_size,
            occupied: HashSet::new(),
        }
    }

    pub fn accepts(&self, cell: Cell) -> bool {
        self.grid.is_passable(cell)
            && cell != self.start
            && cell != self.exit
            && !self.occupied.contains(&cell)
    }

    /// Makes `draws` attempts. `jitter` is the fraction of the cell footprint
    /// the centre may wander across on each axis.
    pub fn sample(&mut self, dice: &mut impl Dice, draws: usize, jitter: f32) -> Vec<Placement> {
        let mut placed = Vec::new();
        for _ in 0..draws {
            let cell = Cell::new(dice.below(self.grid.rows), dice.below(self.grid.cols));
            if !self.accepts(cell) {
                continue;
            }
            self.occupied.insert(cell);

            let (x, z) = self.grid.cell_to_world(cell, self.cell_size);
            let spread = jitter * self.cell_size;
            let dx = (dice.unit() - 0.5) * spread;
            let dz = (dice.unit() - 0.5) * spread;
            placed.push(Placement {
                cell,
                position: (x + dx, z + dz),
            });
        }
        placed
    }

    pub fn occupied(&self) -> usize {
        self.occupied.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::exit::ExitSelector;
    use crate::maze::generator::MazeGenerator;
    use crate::maze::testing::ScriptedDice;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// A 3x3 grid with the start, the exit and exactly two other open cells.
    fn two_slot_grid() -> (Grid, Cell) {
        let grid = Grid::from_rows(&[
            &[false, true, false],
            &[false, true, true],
            &[false, true, false],
        ]);
        (grid, Cell::new(0, 1))
    }

    /// Ten draws into two valid cells never realise more than two entities.
    #[test]
    fn test_ten_draws_two_slots() {
        let (grid, exit) = two_slot_grid();
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sampler = PlacementSampler::new(&grid, exit, 6.0);
            let placed = sampler.sample(&mut rng, 10, 0.8);
            assert!(placed.len() <= 2);
            for p in &placed {
                assert!(p.cell == Cell::new(1, 2) || p.cell == Cell::new(2, 1));
            }
        }
    }

    /// Scripted draws hitting the start, the exit, a wall and a duplicate are
    /// all rejected without retry.
    #[test]
    fn test_rejected_draws_are_not_retried() {
        let (grid, exit) = two_slot_grid();
        let mut sampler = PlacementSampler::new(&grid, exit, 6.0);
        // (1,1) start, (0,1) exit, (0,0) wall, (1,2) ok, (1,2) duplicate
        let mut dice = ScriptedDice::new(&[1, 1, 0, 1, 0, 0, 1, 2, 1, 2]);
        let placed = sampler.sample(&mut dice, 5, 0.8);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].cell, Cell::new(1, 2));
        // ScriptedDice rolls 0.5 for jitter, so the centre is exact.
        assert_eq!(placed[0].position, grid.cell_to_world(Cell::new(1, 2), 6.0));
        assert_eq!(sampler.occupied(), 1);
    }

    /// Occupancy carries over between batches of the same sampler.
    #[test]
    fn test_batches_share_occupancy() {
        let (grid, exit) = two_slot_grid();
        let mut sampler = PlacementSampler::new(&grid, exit, 6.0);
        let first = sampler.sample(&mut ScriptedDice::new(&[1, 2]), 1, 0.0);
        let second = sampler.sample(&mut ScriptedDice::new(&[1, 2, 2, 1]), 2, 0.0);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].cell, Cell::new(2, 1));
    }

    /// On real mazes placements stay inside their cell and avoid start and exit.
    #[test]
    fn test_placements_avoid_start_and_exit() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut grid = MazeGenerator::new(15, 15).carve(&mut rng);
        let exit = ExitSelector::select(&mut grid, &mut rng).cell;
        let mut sampler = PlacementSampler::new(&grid, exit, 6.0);
        let placed = sampler.sample(&mut rng, 200, 0.8);
        assert!(!placed.is_empty());
        for p in &placed {
            assert_ne!(p.cell, grid.start());
            assert_ne!(p.cell, exit);
            assert!(grid.is_passable(p.cell));
            let (cx, cz) = grid.cell_to_world(p.cell, 6.0);
            assert!((p.position.0 - cx).abs() <= 2.4 + 1e-4);
            assert!((p.position.1 - cz).abs() <= 2.4 + 1e-4);
        }
    }
}
