use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// A cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Cell { row, col }
    }

    /// Manhattan distance between two cells
    pub fn manhattan(&self, other: &Cell) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Cell shifted by (d_row, d_col)
    pub fn offset(&self, d_row: i32, d_col: i32) -> Cell {
        Cell::new(self.row + d_row, self.col + d_col)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Cell::new(row, col)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Orthogonal moves, in the order neighbours are generated
pub const ORTHOGONAL: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Cost of stepping INTO a cell carrying `code`.
///
/// Only the street-condition codes 1, 2, 4 and 5 are priced. Every other code,
/// including 0 and 3, is `None` (infinite).
pub fn step_cost(code: i32) -> Option<u32> {
    match code {
        1 => Some(1),
        2 => Some(2),
        4 => Some(4),
        5 => Some(5),
        _ => None,
    }
}

/// Street grid of cost-codes, stored row-major.
/// Negative values are obstacles; see [`step_cost`] for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    pub cells: Vec<i32>,
}

impl Grid {
    /// Create a grid with every cell set to `code`
    pub fn filled(rows: i32, cols: i32, code: i32) -> Self {
        Grid {
            rows,
            cols,
            cells: vec![code; (rows.max(0) * cols.max(0)) as usize],
        }
    }

    /// Build a grid from nested rows. Rows must be non-empty and equally long.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, GridError> {
        let cols = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(GridError::Empty),
        };

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::Ragged {
                    row: index,
                    expected: cols,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Grid {
            rows: rows.len() as i32,
            cols: cols as i32,
            cells,
        })
    }

    /// The 20x30 street layout served when no grid file is configured:
    /// all cost-1 streets, with a 3-wide wall of obstacles across
    /// columns 9..=11 from row 0 down to row 15.
    pub fn demo_streets() -> Self {
        let mut grid = Grid::filled(20, 30, 1);
        for row in 0..=15 {
            for col in 9..=11 {
                grid.set(Cell::new(row, col), -1);
            }
        }
        grid
    }

    /// Check if a cell lies inside the grid
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.rows && cell.col >= 0 && cell.col < self.cols
    }

    fn index(&self, cell: Cell) -> usize {
        (cell.row * self.cols + cell.col) as usize
    }

    /// Cost-code at `cell`, or `None` when out of bounds
    pub fn get(&self, cell: Cell) -> Option<i32> {
        if self.in_bounds(cell) {
            Some(self.cells[self.index(cell)])
        } else {
            None
        }
    }

    /// Set the cost-code at `cell`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: Cell, code: i32) {
        if self.in_bounds(cell) {
            let id = self.index(cell);
            self.cells[id] = code;
        }
    }

    /// True for in-bounds cells with a negative code
    pub fn is_obstacle(&self, cell: Cell) -> bool {
        matches!(self.get(cell), Some(code) if code < 0)
    }

    /// Traversal cost of entering `cell`; `None` when infinite or out of bounds
    pub fn cost(&self, cell: Cell) -> Option<u32> {
        self.get(cell).and_then(step_cost)
    }

    /// In-bounds orthogonal neighbours whose code is not an obstacle.
    ///
    /// Codes without a price (0, 3, ...) pass this check; they are only
    /// rejected later when their step cost turns out to be infinite.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        ORTHOGONAL
            .iter()
            .map(move |&(dr, dc)| cell.offset(dr, dc))
            .filter(move |&next| matches!(self.get(next), Some(code) if code > -1))
    }

    /// Nested rows, for serialization to clients
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        self.cells
            .chunks(self.cols.max(1) as usize)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Distinct codes present in the grid, ascending
    pub fn unique_codes(&self) -> Vec<i32> {
        let mut codes = self.cells.clone();
        codes.sort_unstable();
        codes.dedup();
        codes
    }
}
