//! PDF backend for [`DocumentWriter`], built on `pdf-writer`.
//!
//! Sheets are laid out in inches from the top-left corner; PDF user space is in
//! points from the bottom-left. Fonts are the non-embedded base-14 faces with
//! WinAnsi encoding, which keeps the glyph widths in `font_metrics` authoritative.

use std::path::Path;

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use tracing::{debug, warn};

use crate::sheets::error::SheetError;
use crate::sheets::font_metrics::{win_ansi_code, FontFamily};
use crate::sheets::render::{DocumentWriter, TextBaseline};
use crate::sheets::template::{SheetFont, TextAlign};

const PT_PER_IN: f32 = 72.0;

struct RegisteredFont {
    family: FontFamily,
    bold: bool,
    resource_name: String,
    id: Ref,
}

struct OpenPage {
    id: Ref,
    content_id: Ref,
    width_pt: f32,
    height_pt: f32,
    content: Content,
}

/// An in-memory PDF being assembled page by page.
pub struct PdfDocument {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    page_ids: Vec<Ref>,
    fonts: Vec<RegisteredFont>,
    current_font: Option<(usize, SheetFont)>,
    page: Option<OpenPage>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        Self {
            pdf: Pdf::new(),
            next_id: 3,
            catalog_id: Ref::new(1),
            pages_id: Ref::new(2),
            page_ids: Vec::new(),
            fonts: Vec::new(),
            current_font: None,
            page: None,
        }
    }

    #[cfg(test)]
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.page.is_some())
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    /// Returns the index of the font object for this face, writing it on first use.
    fn register_font(&mut self, family: FontFamily, bold: bool) -> usize {
        if let Some(i) = self
            .fonts
            .iter()
            .position(|f| f.family == family && f.bold == bold)
        {
            return i;
        }

        let id = self.alloc();
        let base_font = family.base_font_name(bold);
        self.pdf
            .type1_font(id)
            .base_font(Name(base_font.as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        self.fonts.push(RegisteredFont {
            family,
            bold,
            resource_name: format!("F{}", self.fonts.len() + 1),
            id,
        });
        debug!(base_font, "Registered PDF font");
        self.fonts.len() - 1
    }

    /// Writes the open page's content stream and page object.
    fn flush_page(&mut self) {
        let Some(open) = self.page.take() else {
            return;
        };

        let bytes = open.content.finish();
        self.pdf.stream(open.content_id, &bytes);

        let mut page = self.pdf.page(open.id);
        page.media_box(Rect::new(0.0, 0.0, open.width_pt, open.height_pt))
            .parent(self.pages_id)
            .contents(open.content_id);
        {
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for font in &self.fonts {
                fonts.pair(Name(font.resource_name.as_bytes()), font.id);
            }
        }
        drop(page);

        self.page_ids.push(open.id);
    }

    /// Serializes the document.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_page();

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .kids(self.page_ids.iter().copied())
            .count(self.page_ids.len() as i32);

        self.pdf.finish()
    }

    /// Serializes the document and writes it to `path`.
    #[allow(dead_code)]
    pub fn save(self, path: impl AsRef<Path>) -> Result<(), SheetError> {
        let bytes = self.finish();
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}

impl DocumentWriter for PdfDocument {
    fn set_font(&mut self, font: &SheetFont) {
        let index = self.register_font(font.family, font.bold);
        self.current_font = Some((index, font.clone()));
    }

    fn wrap_to_width(&self, text: &str, width_in: f32, font: &SheetFont) -> Vec<String> {
        font.metrics().wrap_to_width(text, width_in, font.size_pt)
    }

    fn add_page(&mut self, width_in: f32, height_in: f32) {
        self.flush_page();
        let id = self.alloc();
        let content_id = self.alloc();
        self.page = Some(OpenPage {
            id,
            content_id,
            width_pt: width_in * PT_PER_IN,
            height_pt: height_in * PT_PER_IN,
            content: Content::new(),
        });
    }

    fn draw_text(&mut self, lines: &[String], x_in: f32, y_in: f32, align: TextAlign, baseline: TextBaseline) {
        let Some((font_index, font)) = self.current_font.as_ref() else {
            warn!("draw_text called before set_font; skipping");
            return;
        };
        let Some(open) = self.page.as_mut() else {
            warn!("draw_text called before add_page; skipping");
            return;
        };

        let metrics = font.metrics();
        let resource = Name(self.fonts[*font_index].resource_name.as_bytes());
        let line_height_in = font.size_in() * font.line_height_factor;
        let first_baseline_in = match baseline {
            TextBaseline::Top => y_in + metrics.ascent_in(font.size_pt),
            TextBaseline::Alphabetic => y_in,
        };

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let x = match align {
                TextAlign::Left => x_in,
                TextAlign::Center => x_in - metrics.measure_in(line, font.size_pt) / 2.0,
            };
            let y = first_baseline_in + line_height_in * i as f32;
            let encoded = encode_win_ansi(line);

            open.content.begin_text();
            open.content.set_font(resource, font.size_pt);
            open.content
                .next_line(x * PT_PER_IN, open.height_pt - y * PT_PER_IN);
            open.content.show(Str(&encoded));
            open.content.end_text();
        }
    }

    fn draw_rect(&mut self, x_in: f32, y_in: f32, width_in: f32, height_in: f32, stroke_width_in: f32) {
        let Some(open) = self.page.as_mut() else {
            warn!("draw_rect called before add_page; skipping");
            return;
        };

        let bottom_pt = open.height_pt - (y_in + height_in) * PT_PER_IN;
        open.content.save_state();
        open.content.set_line_width(stroke_width_in * PT_PER_IN);
        open.content.rect(
            x_in * PT_PER_IN,
            bottom_pt,
            width_in * PT_PER_IN,
            height_in * PT_PER_IN,
        );
        open.content.stroke();
        open.content.restore_state();
    }
}

/// Maps text to WinAnsi bytes. Characters outside the encoding become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_code(c).unwrap_or(b'?'))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
