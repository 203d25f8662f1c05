//! Sheet packing: distributes an ordered label list over sheet grids.
//!
//! # Fill order
//! Partial sheets are resumed in the order given, then blank sheets are started.
//! Within a sheet the free cells are collected from the last row/last column
//! backwards and popped from the end, so labels land row-major from the top-left.
//! That placement is what gets printed, so it must stay stable across releases.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::sheets::error::SheetError;
use crate::sheets::grid::{CellCoord, CellState, PartialSheet, PopulatedSheet};
use crate::sheets::template::SheetFactory;

/// Result of one packing run.
#[derive(Debug, Clone, PartialEq)]
pub struct PackOutcome {
    /// Sheets ready to render, in fill order.
    pub sheets: Vec<PopulatedSheet>,
    /// Leftover capacity: the last sheet if it was left partly empty, followed by
    /// the partial sheets this run never reached.
    pub remaining_partials: Vec<PartialSheet>,
    pub stats: PackStats,
}

/// Counters for logging and API responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PackStats {
    pub labels_placed: usize,
    pub partials_resumed: usize,
    pub blank_sheets_started: usize,
}

/// Free-space stack for one sheet: reverse row-major, so popping yields row-major order.
/// `None` means a blank sheet where every cell is free.
fn free_space_stack(partial: Option<&PartialSheet>, num_rows: usize, num_cols: usize) -> Vec<CellCoord> {
    let mut stack = Vec::with_capacity(num_rows * num_cols);
    for row in (0..num_rows).rev() {
        for col in (0..num_cols).rev() {
            let free = partial.map_or(true, |p| p.state(row, col) == CellState::Free);
            if free {
                stack.push((row, col));
            }
        }
    }
    stack
}

/// Packs `labels` into sheets, resuming `partials` before starting blank sheets.
///
/// Labels keep their input order. Inputs are never mutated; the returned partial
/// sheets are fresh records. An empty label list returns the partials untouched.
///
/// Errors if any partial sheet's shape differs from the factory's template.
pub fn pack_sheets(
    labels: &[String],
    factory: &SheetFactory,
    partials: &[PartialSheet],
) -> Result<PackOutcome, SheetError> {
    let num_rows = factory.num_rows();
    let num_cols = factory.num_cols();

    for partial in partials {
        partial.check_dimensions(num_rows, num_cols)?;
    }

    if labels.is_empty() {
        return Ok(PackOutcome {
            sheets: Vec::new(),
            remaining_partials: partials.to_vec(),
            stats: PackStats::default(),
        });
    }

    if num_rows == 0 || num_cols == 0 {
        return Err(SheetError::InvalidTemplate {
            name: factory.describe().name.clone(),
            reason: "template has no cells".to_string(),
        });
    }

    let mut sheets: Vec<PopulatedSheet> = Vec::new();
    let mut current: Option<PopulatedSheet> = None;
    let mut free: Vec<CellCoord> = Vec::new();
    let mut partial_index = 0usize;
    let mut stats = PackStats::default();

    for label in labels {
        if free.is_empty() {
            if let Some(done) = current.take() {
                sheets.push(done);
            }

            // Resume the next partial that still has room; fully occupied ones carry no capacity.
            while free.is_empty() && partial_index < partials.len() {
                free = free_space_stack(Some(&partials[partial_index]), num_rows, num_cols);
                if free.is_empty() {
                    warn!(partial_index, "Skipping partial sheet with no free cells");
                } else {
                    debug!(partial_index, free_cells = free.len(), "Resuming partial sheet");
                    stats.partials_resumed += 1;
                }
                partial_index += 1;
            }
            if free.is_empty() {
                free = free_space_stack(None, num_rows, num_cols);
                debug!(sheet = sheets.len(), "Starting blank sheet");
                stats.blank_sheets_started += 1;
            }

            current = Some(factory.create_empty());
        }

        // A blank sheet always has a free cell, so the refill above leaves one open.
        let (Some(sheet), Some(coord)) = (current.as_mut(), free.pop()) else {
            unreachable!("no open sheet with a free cell after refill");
        };
        sheet.set(coord, label.clone());
        stats.labels_placed += 1;
    }

    if let Some(last) = current.take() {
        sheets.push(last);
    }

    let tail = partials[partial_index..]
        .iter()
        .filter(|p| p.free_count() > 0)
        .cloned();

    let remaining_partials: Vec<PartialSheet> = if free.is_empty() {
        tail.collect()
    } else {
        std::iter::once(PartialSheet::with_free_cells(num_rows, num_cols, &free))
            .chain(tail)
            .collect()
    };

    info!(
        labels = labels.len(),
        sheets = sheets.len(),
        partials_in = partials.len(),
        partials_out = remaining_partials.len(),
        "Packed labels into sheets"
    );

    Ok(PackOutcome {
        sheets,
        remaining_partials,
        stats,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
