use std::fmt::Write;

use crate::prelude::*;

/// Largest row or column count a [`Cell`] can address
pub const MAX_GRID_DIM: usize = u8::MAX as usize;

/// A cell coordinate on the board, `(row, col)`
#[derive(Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    #[inline(always)]
    pub const fn new(row: usize, col: usize) -> Self {
        Self {
            row: row as u8,
            col: col as u8,
        }
    }

    #[inline(always)]
    pub const fn row(&self) -> usize {
        self.row as usize
    }

    #[inline(always)]
    pub const fn col(&self) -> usize {
        self.col as usize
    }

    /// Chebyshev (king-move) distance between two cells
    pub fn distance(&self, other: Cell) -> usize {
        let dr = self.row().abs_diff(other.row());
        let dc = self.col().abs_diff(other.col());
        dr.max(dc)
    }

    /// True when both cells differ and touch, diagonals included
    pub fn is_adjacent(&self, other: Cell) -> bool {
        self.distance(other) == 1
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Row-major grid of signed tower values.
/// `|value|` is the tower height, the sign is the owner of the top piece.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<i8>,
}

impl Grid {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![0; rows * columns],
        }
    }

    pub fn from_rows<R: AsRef<[i8]>>(rows: &[R]) -> miette::Result<Self> {
        miette::ensure!(!rows.is_empty(), "Grid needs at least one row");
        let columns = rows[0].as_ref().len();
        miette::ensure!(columns > 0, "Grid needs at least one column");
        // Cell coordinates are stored as u8
        miette::ensure!(
            rows.len() <= MAX_GRID_DIM && columns <= MAX_GRID_DIM,
            "Grid of {}x{columns} exceeds {MAX_GRID_DIM} rows or columns",
            rows.len()
        );

        let mut cells = Vec::with_capacity(rows.len() * columns);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            miette::ensure!(
                row.len() == columns,
                "Row {i} has {} cells, expected {columns}",
                row.len()
            );
            cells.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            columns,
            cells,
        })
    }

    /// Grid from a fixed-size array, rectangular by construction
    pub fn from_array<const R: usize, const C: usize>(rows: &[[i8; C]; R]) -> Self {
        Self {
            rows: R,
            columns: C,
            cells: rows.iter().flatten().copied().collect(),
        }
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline(always)]
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.columns, "({row}, {col}) off grid");
        row * self.columns + col
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.cells[self.index(row, col)]
    }

    #[inline(always)]
    pub fn at(&self, cell: Cell) -> i8 {
        self.get(cell.row(), cell.col())
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, value: i8) {
        let idx = self.index(row, col);
        self.cells[idx] = value;
    }

    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.columns
    }

    /// Iterates `(cell, value)` over every cell, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Cell, i8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &v)| (Cell::new(i / self.columns, i % self.columns), v))
    }

    /// Iterates the non-empty cells only
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, i8)> + '_ {
        self.iter().filter(|&(_, v)| v != 0)
    }

    pub fn tower_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// +1 for every positive tower, -1 for every negative one
    pub fn signed_count(&self) -> i32 {
        self.cells.iter().map(|&v| v.signum() as i32).sum()
    }

    /// Colour swap: every tower changes owner
    pub fn inverted(&self) -> Self {
        Self {
            rows: self.rows,
            columns: self.columns,
            cells: self.cells.iter().map(|&v| -v).collect(),
        }
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        write!(out, "   ")?;
        for col in 0..self.columns {
            write!(out, "{col:>3}")?;
        }
        writeln!(out)?;
        for row in 0..self.rows {
            write!(out, "{row:>2} ")?;
            for col in 0..self.columns {
                match self.get(row, col) {
                    0 => write!(out, "  .")?,
                    v => write!(out, "{v:>3}")?,
                }
            }
            writeln!(out)?;
        }
        write!(f, "{out}")
    }
}
