use thiserror::Error;

/// Validation failures raised by packing and rendering.
///
/// Every variant is fatal for the call that produced it: nothing is retried,
/// truncated, or partially written.
#[derive(Debug, Error)]
pub enum SheetError {
    /// A grid whose row count does not match the template.
    #[error("Number of rows must be {expected} (got {actual})")]
    RowMismatch { expected: usize, actual: usize },

    /// A grid row whose column count does not match the template. `row` is 1-based.
    #[error("Number of columns must be {expected} (got {actual} in row {row})")]
    ColumnMismatch {
        expected: usize,
        actual: usize,
        row: usize,
    },

    /// The wrapped label text is taller than the cell.
    #[error(
        "Label text \"{text}\" is too many rows ({lines} lines need {text_height_in:.3}in, cell is {label_height_in:.3}in)"
    )]
    TextOverflow {
        text: String,
        lines: usize,
        text_height_in: f32,
        label_height_in: f32,
    },

    #[error("Cannot create a document from an empty sheets list")]
    EmptyRenderSet,

    /// Template geometry that cannot fit on its own page.
    #[error("Invalid template \"{name}\": {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
