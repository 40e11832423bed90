//! Boolean occupancy grid and the cell/world coordinate mapping.

/// Represents a cell in the maze grid
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Row index of the cell
    pub row: usize,
    /// Column index of the cell
    pub col: usize,
}

impl Cell {
    /// Creates a new Cell with the given coordinates
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offsets the cell by a signed step, returning `None` below zero.
    pub fn offset(&self, d_row: isize, d_col: isize) -> Option<Cell> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Some(Cell::new(row, col))
    }
}

/// A `rows x cols` occupancy grid where `true` marks a passable cell.
///
/// Rows run along world Z and columns along world X. The grid is centred on
/// the world origin, so the mapping between a cell index and the world
/// coordinate of its centre is
///
/// ```text
/// world = (index - n / 2) * cell_size + cell_size / 2
/// ```
///
/// with `n / 2` evaluated as a real number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    /// Row-major passability, `passable[row][col]`.
    pub passable: Vec<Vec<bool>>,
}

impl Grid {
    /// A fully blocked grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            passable: vec![vec![false; cols]; rows],
        }
    }

    /// Builds a grid from literal rows. All rows must share one length.
    #[cfg(test)]
    pub fn from_rows(rows: &[&[bool]]) -> Self {
        let cols = rows.first().map_or(0, |row| row.len());
        debug_assert!(rows.iter().all(|row| row.len() == cols));
        Self {
            rows: rows.len(),
            cols,
            passable: rows.iter().map(|row| row.to_vec()).collect(),
        }
    }

    /// The fixed carving origin, `(rows / 2, cols / 2)`.
    pub fn start(&self) -> Cell {
        Cell::new(self.rows / 2, self.cols / 2)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Out-of-bounds cells read as blocked.
    pub fn is_passable(&self, cell: Cell) -> bool {
        self.contains(cell) && self.passable[cell.row][cell.col]
    }

    pub fn open(&mut self, cell: Cell) {
        if self.contains(cell) {
            self.passable[cell.row][cell.col] = true;
        }
    }

    pub fn is_boundary(&self, cell: Cell) -> bool {
        self.contains(cell)
            && (cell.row == 0
                || cell.col == 0
                || cell.row == self.rows - 1
                || cell.col == self.cols - 1)
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Cell::new(row, col)))
    }

    pub fn passable_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(|cell| self.is_passable(*cell))
    }

    pub fn blocked_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(|cell| !self.is_passable(*cell))
    }

    pub fn passable_count(&self) -> usize {
        self.passable.iter().flatten().filter(|open| **open).count()
    }

    /// World-space `(x, z)` of a cell centre.
    pub fn cell_to_world(&self, cell: Cell, cell_size: f32) -> (f32, f32) {
        (
            axis_to_world(cell.col, self.cols, cell_size),
            axis_to_world(cell.row, self.rows, cell_size),
        )
    }

    /// The cell whose footprint contains world `(x, z)`, if it is inside the
    /// grid.
    #[cfg(test)]
    pub fn world_to_cell(&self, x: f32, z: f32, cell_size: f32) -> Option<Cell> {
        let col = world_to_axis(x, self.cols, cell_size)?;
        let row = world_to_axis(z, self.rows, cell_size)?;
        let cell = Cell::new(row, col);
        self.contains(cell).then_some(cell)
    }

    /// Cells reachable from `from` through passable 4-neighbours.
    #[cfg(test)]
    pub fn flood_fill(&self, from: Cell) -> Vec<Cell> {
        if !self.is_passable(from) {
            return Vec::new();
        }
        let mut seen = vec![vec![false; self.cols]; self.rows];
        let mut stack = vec![from];
        let mut reached = Vec::new();
        seen[from.row][from.col] = true;
        while let Some(cell) = stack.pop() {
            reached.push(cell);
            for (dr, dc) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                if let Some(next) = cell.offset(dr, dc) {
                    if self.is_passable(next) && !seen[next.row][next.col] {
                        seen[next.row][next.col] = true;
                        stack.push(next);
                    }
                }
            }
        }
        reached
    }
}

fn axis_to_world(index: usize, n: usize, cell_size: f32) -> f32 {
    (index as f32 - n as f32 / 2.0) * cell_size + cell_size / 2.0
}

#[cfg(test)]
fn world_to_axis(world: f32, n: usize, cell_size: f32) -> Option<usize> {
    let index = (world / cell_size + n as f32 / 2.0).floor();
    (index >= 0.0).then_some(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The centre cell of an odd grid sits on the world origin.
    #[test]
    fn test_start_cell_maps_to_origin() {
        let grid = Grid::new(35, 35);
        assert_eq!(grid.start(), Cell::new(17, 17));
        let (x, z) = grid.cell_to_world(grid.start(), 6.0);
        assert!(x.abs() < 1e-5 && z.abs() < 1e-5);
    }

    /// world_to_cell inverts cell_to_world for every cell.
    #[test]
    fn test_mapping_round_trips() {
        let grid = Grid::new(7, 9);
        for cell in grid.cells() {
            let (x, z) = grid.cell_to_world(cell, 6.0);
            assert_eq!(grid.world_to_cell(x, z, 6.0), Some(cell));
        }
        assert_eq!(grid.world_to_cell(-1000.0, 0.0, 6.0), None);
        assert_eq!(grid.world_to_cell(0.0, 1000.0, 6.0), None);
    }

    #[test]
    fn test_columns_map_to_x() {
        let grid = Grid::new(5, 5);
        let (x, z) = grid.cell_to_world(Cell::new(0, 4), 6.0);
        assert_eq!(x, 12.0);
        assert_eq!(z, -12.0);
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let mut grid = Grid::new(3, 3);
        grid.open(Cell::new(1, 1));
        grid.open(Cell::new(5, 5));
        assert!(grid.is_passable(Cell::new(1, 1)));
        assert!(!grid.is_passable(Cell::new(5, 5)));
        assert_eq!(grid.passable_count(), 1);
        assert!(grid.is_boundary(Cell::new(0, 1)));
        assert!(!grid.is_boundary(Cell::new(1, 1)));
    }
}
