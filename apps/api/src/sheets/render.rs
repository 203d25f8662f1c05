//! Sheet rendering. Fits each cell's label into its box and draws it through a
//! [`DocumentWriter`].
//!
//! Rendering is two-phase: every cell of every sheet is laid out and validated
//! first, and only then are pages drawn. A label that overflows its cell aborts
//! the export before the writer has seen a single page.

use tracing::{debug, trace};

use crate::sheets::error::SheetError;
use crate::sheets::grid::PopulatedSheet;
use crate::sheets::template::{SheetFont, SheetTemplate, TextAlign};

/// Stroke width of the debug cell border, in inches.
pub const BORDER_STROKE_IN: f32 = 0.02;

/// Vertical anchor of the `y` passed to [`DocumentWriter::draw_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    /// `y` is the top of the first line's em box.
    Top,
    /// `y` is the first line's baseline.
    #[allow(dead_code)]
    Alphabetic,
}

/// Drawing surface for sheets. Coordinates are inches from the page's top-left corner.
pub trait DocumentWriter {
    /// Selects the font used by subsequent `draw_text` calls.
    fn set_font(&mut self, font: &SheetFont);

    /// Splits `text` into lines that fit `width_in` using the font's glyph metrics.
    fn wrap_to_width(&self, text: &str, width_in: f32, font: &SheetFont) -> Vec<String>;

    /// Starts a new page; following draw calls target it.
    fn add_page(&mut self, width_in: f32, height_in: f32);

    /// Draws `lines` one below another, spaced by the current font's line height.
    fn draw_text(&mut self, lines: &[String], x_in: f32, y_in: f32, align: TextAlign, baseline: TextBaseline);

    fn draw_rect(&mut self, x_in: f32, y_in: f32, width_in: f32, height_in: f32, stroke_width_in: f32);
}

// ────────────────────────────────────────────────────────────────────────────
// Cell layout
// ────────────────────────────────────────────────────────────────────────────

/// Where and how one cell's text block is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub lines: Vec<String>,
    pub text_x: f32,
    pub text_y: f32,
    pub text_height: f32,
    pub align: TextAlign,
}

/// Places already-wrapped `lines` in cell (`row`, `col`): vertically centered,
/// horizontally per the font's alignment.
///
/// Returns `None` for zero lines (an empty cell draws nothing) and
/// `SheetError::TextOverflow` when the block is taller than the cell.
pub fn layout_cell(
    template: &SheetTemplate,
    row: usize,
    col: usize,
    lines: Vec<String>,
) -> Result<Option<CellLayout>, SheetError> {
    if lines.is_empty() {
        return Ok(None);
    }

    let text_height = template.text_height_in(lines.len());
    if text_height > template.label_height_in {
        return Err(SheetError::TextOverflow {
            text: lines.join("\n"),
            lines: lines.len(),
            text_height_in: text_height,
            label_height_in: template.label_height_in,
        });
    }

    let (x, y) = template.cell_origin(row, col);
    let text_y = y + template.label_height_in / 2.0 - text_height / 2.0;
    let align = template.font.align;
    let text_x = match align {
        TextAlign::Center => x + template.label_width_in / 2.0,
        TextAlign::Left => x,
    };

    Ok(Some(CellLayout {
        lines,
        text_x,
        text_y,
        text_height,
        align,
    }))
}

/// Lays out every cell of a sheet in row-major order without drawing anything.
pub fn plan_sheet<W: DocumentWriter + ?Sized>(
    writer: &W,
    sheet: &PopulatedSheet,
) -> Result<Vec<Option<CellLayout>>, SheetError> {
    let template = sheet.template();
    let mut plan = Vec::with_capacity(template.capacity());
    for (row, cells) in sheet.rows().iter().enumerate() {
        for (col, text) in cells.iter().enumerate() {
            let lines = writer.wrap_to_width(text, template.label_width_in, &template.font);
            plan.push(layout_cell(template, row, col, lines)?);
        }
    }
    Ok(plan)
}

fn draw_plan<W: DocumentWriter + ?Sized>(
    writer: &mut W,
    template: &SheetTemplate,
    plan: &[Option<CellLayout>],
    show_border: bool,
) {
    writer.set_font(&template.font);
    for (i, cell) in plan.iter().enumerate() {
        let (row, col) = (i / template.num_cols, i % template.num_cols);
        if show_border {
            let (x, y) = template.cell_origin(row, col);
            writer.draw_rect(
                x,
                y,
                template.label_width_in,
                template.label_height_in,
                BORDER_STROKE_IN,
            );
        }
        if let Some(layout) = cell {
            trace!(row, col, lines = layout.lines.len(), height_in = layout.text_height, "Drawing cell");
            writer.draw_text(
                &layout.lines,
                layout.text_x,
                layout.text_y,
                layout.align,
                TextBaseline::Top,
            );
        }
    }
}

/// Draws one sheet onto the writer's current page.
#[allow(dead_code)]
pub fn render_sheet<W: DocumentWriter + ?Sized>(
    writer: &mut W,
    sheet: &PopulatedSheet,
    show_border: bool,
) -> Result<(), SheetError> {
    let plan = plan_sheet(writer, sheet)?;
    draw_plan(writer, sheet.template(), &plan, show_border);
    Ok(())
}

/// Adds one page per sheet, sized to that sheet's template.
///
/// Rejects an empty sheet list: a document needs at least one page.
pub fn export_document<W: DocumentWriter + ?Sized>(
    writer: &mut W,
    sheets: &[PopulatedSheet],
    show_border: bool,
) -> Result<(), SheetError> {
    if sheets.is_empty() {
        return Err(SheetError::EmptyRenderSet);
    }

    let plans = sheets
        .iter()
        .map(|sheet| plan_sheet(writer, sheet))
        .collect::<Result<Vec<_>, _>>()?;

    for (sheet, plan) in sheets.iter().zip(plans.iter()) {
        let template = sheet.template();
        writer.add_page(template.width_in, template.height_in);
        draw_plan(writer, template, plan, show_border);
    }

    debug!(pages = sheets.len(), show_border, "Rendered sheets");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
