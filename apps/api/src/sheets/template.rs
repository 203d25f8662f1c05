//! Physical sheet templates and the geometry derived from them.
//!
//! A template is plain data: two sheet types differ only in the numbers they
//! carry. The stock presets are built once in `main` and handed around through
//! `AppState`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::sheets::error::SheetError;
use crate::sheets::font_metrics::{get_metrics, pt_to_in, FontFamily, FontMetricTable};
use crate::sheets::grid::{check_dimensions, PopulatedSheet};

// ────────────────────────────────────────────────────────────────────────────
// Template value types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Center,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetFont {
    pub family: FontFamily,
    pub size_pt: f32,
    pub bold: bool,
    pub line_height_factor: f32,
    pub align: TextAlign,
}

impl SheetFont {
    pub fn metrics(&self) -> &'static FontMetricTable {
        get_metrics(self.family, self.bold)
    }

    pub fn size_in(&self) -> f32 {
        pt_to_in(self.size_pt)
    }
}

/// Geometry and font for one physical sheet type. All lengths are in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetTemplate {
    pub name: String,
    pub width_in: f32,
    pub height_in: f32,
    pub num_rows: usize,
    pub num_cols: usize,
    pub label_width_in: f32,
    pub label_height_in: f32,
    pub col_separation_in: f32,
    pub row_separation_in: f32,
    pub font: SheetFont,
}

impl SheetTemplate {
    /// Avery 5412 label sheet: 4 × 5 spine labels on a 6in × 4in card.
    pub fn avery_5412() -> Self {
        SheetTemplate {
            name: "Avery 5412".to_string(),
            width_in: 6.0,
            height_in: 4.0,
            num_rows: 4,
            num_cols: 5,
            label_width_in: 1.0,
            label_height_in: 0.75,
            col_separation_in: 0.06,
            row_separation_in: 0.0,
            font: SheetFont {
                family: FontFamily::Helvetica,
                size_pt: 13.0,
                bold: true,
                line_height_factor: 1.15,
                align: TextAlign::Center,
            },
        }
    }

    /// US letter companion sheet, landscape, mirroring the label grid with room for a catalog card.
    pub fn us_letter_companion() -> Self {
        SheetTemplate {
            name: "US Letter".to_string(),
            width_in: 11.0,
            height_in: 8.5,
            num_rows: 4,
            num_cols: 5,
            label_width_in: 1.9,
            label_height_in: 1.8125,
            col_separation_in: 0.125,
            row_separation_in: 1.0 / 12.0,
            font: SheetFont {
                family: FontFamily::Helvetica,
                size_pt: 10.0,
                bold: false,
                line_height_factor: 1.15,
                align: TextAlign::Left,
            },
        }
    }

    pub fn capacity(&self) -> usize {
        self.num_rows * self.num_cols
    }

    /// Checks that the grid fits on the page. A failure is a configuration
    /// error and is surfaced at startup, not per request.
    pub fn validate(&self) -> Result<(), SheetError> {
        let invalid = |reason: String| SheetError::InvalidTemplate {
            name: self.name.clone(),
            reason,
        };

        if self.num_rows == 0 || self.num_cols == 0 {
            return Err(invalid("grid must have at least one row and column".to_string()));
        }
        if self.font.size_pt <= 0.0 || self.font.line_height_factor <= 0.0 {
            return Err(invalid("font size and line height must be positive".to_string()));
        }
        if self.x_margin() < 0.0 {
            return Err(invalid(format!(
                "{} columns need more than the page width of {}in",
                self.num_cols, self.width_in
            )));
        }
        if self.y_margin() < 0.0 {
            return Err(invalid(format!(
                "{} rows need more than the page height of {}in",
                self.num_rows, self.height_in
            )));
        }
        Ok(())
    }

    /// Left/right margin that centers the grid horizontally.
    pub fn x_margin(&self) -> f32 {
        let cols = self.num_cols as f32;
        (self.width_in - self.label_width_in * cols - self.col_separation_in * (cols - 1.0)) / 2.0
    }

    /// Top/bottom margin that centers the grid vertically.
    pub fn y_margin(&self) -> f32 {
        let rows = self.num_rows as f32;
        (self.height_in - self.label_height_in * rows - self.row_separation_in * (rows - 1.0))
            / 2.0
    }

    /// Top-left corner of a cell, measured from the top-left of the page.
    pub fn cell_origin(&self, row: usize, col: usize) -> (f32, f32) {
        debug_assert!(row < self.num_rows, "Row out-of-bounds");
        debug_assert!(col < self.num_cols, "Column out-of-bounds");

        let x = (self.label_width_in + self.col_separation_in) * col as f32 + self.x_margin();
        let y = (self.label_height_in + self.row_separation_in) * row as f32 + self.y_margin();
        (x, y)
    }

    /// Baseline-to-baseline distance in inches.
    pub fn line_height_in(&self) -> f32 {
        self.font.size_in() * self.font.line_height_factor
    }

    /// Height of a block of `num_lines` lines: full spacing between lines, one em for the last.
    pub fn text_height_in(&self, num_lines: usize) -> f32 {
        if num_lines == 0 {
            return 0.0;
        }
        self.line_height_in() * (num_lines - 1) as f32 + self.font.size_in()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sheet kinds and factory
// ────────────────────────────────────────────────────────────────────────────

/// The two sheet types the app prints from the same label data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    Label,
    Companion,
}

impl std::str::FromStr for SheetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(SheetKind::Label),
            "companion" => Ok(SheetKind::Companion),
            other => Err(format!("Unknown sheet kind \"{other}\"")),
        }
    }
}

/// Creates populated sheets bound to one shared template.
#[derive(Debug, Clone)]
pub struct SheetFactory {
    template: Arc<SheetTemplate>,
}

impl SheetFactory {
    pub fn new(template: Arc<SheetTemplate>) -> Self {
        Self { template }
    }

    pub fn describe(&self) -> &SheetTemplate {
        &self.template
    }

    pub fn num_rows(&self) -> usize {
        self.template.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.template.num_cols
    }

    /// A sheet with every cell set to the empty string.
    pub fn create_empty(&self) -> PopulatedSheet {
        let cells = vec![vec![String::new(); self.num_cols()]; self.num_rows()];
        PopulatedSheet::new_unchecked(cells, Arc::clone(&self.template))
    }

    /// Wraps an explicit grid of labels, rejecting grids of the wrong shape.
    #[allow(dead_code)]
    pub fn create(&self, cells: Vec<Vec<String>>) -> Result<PopulatedSheet, SheetError> {
        check_dimensions(&cells, self.num_rows(), self.num_cols())?;
        Ok(PopulatedSheet::new_unchecked(cells, Arc::clone(&self.template)))
    }
}

/// The templates this process serves, constructed once at startup.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    label: Arc<SheetTemplate>,
    companion: Arc<SheetTemplate>,
}

impl TemplateCatalog {
    pub fn new(label: SheetTemplate, companion: SheetTemplate) -> Result<Self, SheetError> {
        label.validate()?;
        companion.validate()?;
        Ok(Self {
            label: Arc::new(label),
            companion: Arc::new(companion),
        })
    }

    pub fn standard() -> Result<Self, SheetError> {
        Self::new(SheetTemplate::avery_5412(), SheetTemplate::us_letter_companion())
    }

    pub fn template(&self, kind: SheetKind) -> &Arc<SheetTemplate> {
        match kind {
            SheetKind::Label => &self.label,
            SheetKind::Companion => &self.companion,
        }
    }

    pub fn factory(&self, kind: SheetKind) -> SheetFactory {
        SheetFactory::new(Arc::clone(self.template(kind)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
