//! Row-major grids: free/occupied bookkeeping for partly used sheets, and the
//! populated label grids handed to the renderer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::sheets::error::SheetError;
use crate::sheets::template::SheetTemplate;

/// A (row, column) pair inside a template's grid.
pub type CellCoord = (usize, usize);

/// Rejects grids whose shape differs from `num_rows` × `num_cols`.
pub fn check_dimensions<T>(grid: &[Vec<T>], num_rows: usize, num_cols: usize) -> Result<(), SheetError> {
    if grid.len() != num_rows {
        return Err(SheetError::RowMismatch {
            expected: num_rows,
            actual: grid.len(),
        });
    }
    for (i, row) in grid.iter().enumerate() {
        if row.len() != num_cols {
            return Err(SheetError::ColumnMismatch {
                expected: num_cols,
                actual: row.len(),
                row: i + 1,
            });
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Partial sheets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    Free,
    Occupied,
}

/// Unused capacity on a physical sheet that was partly printed in an earlier run.
///
/// Serializes as a bare grid: `[["free", "occupied", ...], ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialSheet {
    cells: Vec<Vec<CellState>>,
}

impl PartialSheet {
    /// A sheet with every cell free.
    pub fn blank(num_rows: usize, num_cols: usize) -> Self {
        Self {
            cells: vec![vec![CellState::Free; num_cols]; num_rows],
        }
    }

    /// A sheet where exactly `free` cells are free and everything else is occupied.
    pub fn with_free_cells(num_rows: usize, num_cols: usize, free: &[CellCoord]) -> Self {
        let mut cells = vec![vec![CellState::Occupied; num_cols]; num_rows];
        for &(row, col) in free {
            cells[row][col] = CellState::Free;
        }
        Self { cells }
    }

    pub fn state(&self, row: usize, col: usize) -> CellState {
        self.cells[row][col]
    }

    pub fn check_dimensions(&self, num_rows: usize, num_cols: usize) -> Result<(), SheetError> {
        check_dimensions(&self.cells, num_rows, num_cols)
    }

    pub fn free_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|s| **s == CellState::Free)
            .count()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Populated sheets
// ────────────────────────────────────────────────────────────────────────────

/// A full grid of label strings tied to the template it will be printed on.
/// An empty string marks a cell left blank.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedSheet {
    cells: Vec<Vec<String>>,
    template: Arc<SheetTemplate>,
}

impl PopulatedSheet {
    /// Callers must have checked the grid shape against the template.
    pub(crate) fn new_unchecked(cells: Vec<Vec<String>>, template: Arc<SheetTemplate>) -> Self {
        Self { cells, template }
    }

    pub fn template(&self) -> &SheetTemplate {
        &self.template
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.cells
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> &str {
        &self.cells[row][col]
    }

    pub(crate) fn set(&mut self, (row, col): CellCoord, label: String) {
        debug_assert!(row < self.template.num_rows, "Row out-of-bounds");
        debug_assert!(col < self.template.num_cols, "Column out-of-bounds");
        self.cells[row][col] = label;
    }

    /// Number of cells holding a non-empty label.
    #[cfg(test)]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().flatten().filter(|s| !s.is_empty()).count()
    }

    pub fn into_cells(self) -> Vec<Vec<String>> {
        self.cells
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
