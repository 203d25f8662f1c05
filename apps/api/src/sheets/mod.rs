// Sheet packing and rendering.
// Packing assigns labels to grid cells, resuming partly used sheets first;
// rendering fits each label into its cell and writes one PDF page per sheet.

pub mod error;
pub mod font_metrics;
pub mod grid;
pub mod handlers;
pub mod packer;
pub mod pdf;
pub mod render;
pub mod template;

// Re-export the public API consumed by main and the router.
pub use template::TemplateCatalog;
