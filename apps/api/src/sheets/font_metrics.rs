//! Static glyph-width tables for the PDF base fonts used by sheet templates.
//!
//! Widths come from the Adobe Font Metrics files for the standard 14 fonts, in
//! 1/1000 em units. Text is written with WinAnsi encoding and the fonts are not
//! embedded, so every character is measured as the WinAnsi glyph it is printed
//! as: characters the encoding cannot represent are measured as `?`.
//!
//! Each table covers WinAnsi codes 0x20..=0x7E (ASCII, 95 slots) and
//! 0x80..=0xFF (128 slots). The five codes WinAnsi leaves undefined are never
//! produced by [`win_ansi_code`] and hold 0.

use serde::{Deserialize, Serialize};

const POINTS_PER_INCH: f32 = 72.0;

/// Converts a point size to inches.
pub fn pt_to_in(size_pt: f32) -> f32 {
    size_pt / POINTS_PER_INCH
}

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// Base-14 font families available to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Proportional sans-serif used by both stock templates.
    Helvetica,
    /// Monospace, handy for call numbers that must line up.
    Courier,
}

impl FontFamily {
    /// PostScript name of the face, as written into the PDF font dictionary.
    pub fn base_font_name(self, bold: bool) -> &'static str {
        match (self, bold) {
            (FontFamily::Helvetica, false) => "Helvetica",
            (FontFamily::Helvetica, true) => "Helvetica-Bold",
            (FontFamily::Courier, false) => "Courier",
            (FontFamily::Courier, true) => "Courier-Bold",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face of a font family.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in 1/1000 em.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
///
/// `upper[i]` = width of WinAnsi code `(i + 0x80)`.
pub struct FontMetricTable {
    widths: [u16; 95],
    upper: [u16; 128],
    /// Height above the baseline, in 1/1000 em.
    pub ascender: u16,
}

impl FontMetricTable {
    /// Width of a single character in 1/1000 em, as printed through WinAnsi.
    fn char_units(&self, c: char) -> u32 {
        let code = win_ansi_code(c).unwrap_or(b'?');
        match code {
            0x20..=0x7E => u32::from(self.widths[usize::from(code) - 0x20]),
            0x80..=0xFF => u32::from(self.upper[usize::from(code) - 0x80]),
            _ => 0,
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        let units: u32 = s.chars().map(|c| self.char_units(c)).sum();
        units as f32 / 1000.0
    }

    /// Measures the rendered width of a string in inches at `size_pt`.
    pub fn measure_in(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * pt_to_in(size_pt)
    }

    /// Distance from the top of the text box to the baseline, in inches.
    pub fn ascent_in(&self, size_pt: f32) -> f32 {
        f32::from(self.ascender) / 1000.0 * pt_to_in(size_pt)
    }

    /// Splits `text` into lines no wider than `width_in` at `size_pt`.
    ///
    /// Explicit `\n` always starts a new line. Within a paragraph words are
    /// packed greedily; a word wider than the whole line is broken between
    /// characters. Text that is empty or only whitespace yields no lines.
    pub fn wrap_to_width(&self, text: &str, width_in: f32, size_pt: f32) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            self.wrap_paragraph(paragraph, width_in, size_pt, &mut lines);
        }
        lines
    }

    fn wrap_paragraph(&self, paragraph: &str, width_in: f32, size_pt: f32, out: &mut Vec<String>) {
        let fits = |s: &str| self.measure_in(s, size_pt) <= width_in + f32::EPSILON;

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !fits(word) {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                let mut chunks = self.break_word(word, width_in, size_pt);
                // The tail of a broken word may still share a line with the next word.
                current = chunks.pop().unwrap_or_default();
                out.extend(chunks);
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                continue;
            }

            let candidate = format!("{current} {word}");
            if fits(&candidate) {
                current = candidate;
            } else {
                out.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        out.push(current);
    }

    /// Breaks an over-long word into chunks that each fit the width.
    /// Every chunk holds at least one character, even if that character alone overflows.
    fn break_word(&self, word: &str, width_in: f32, size_pt: f32) -> Vec<String> {
        let limit_units = width_in / pt_to_in(size_pt) * 1000.0;
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_units = 0u32;

        for c in word.chars() {
            let w = self.char_units(c);
            if !current.is_empty() && (current_units + w) as f32 > limit_units {
                chunks.push(std::mem::take(&mut current));
                current_units = 0;
            }
            current.push(c);
            current_units += w;
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WinAnsi encoding
// ────────────────────────────────────────────────────────────────────────────

/// WinAnsi code for `c`, or `None` if the encoding has no glyph for it.
pub fn win_ansi_code(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    #[rustfmt::skip]
    upper: [
        // €    -    ‚    ƒ    „    …     †    ‡    ˆ    ‰     Š    ‹    Œ     -    Ž    -
        556, 0,   222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0,   611, 0,
        // -    ‘    ’    “    ”    •    –    —     ˜    ™     š    ›    œ    -    ž    Ÿ
        0,   222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0,   500, 667,
        // nbsp ¡    ¢    £    ¤    ¥    ¦    §    ¨    ©    ª    «    ¬    shy  ®    ¯
        278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        // °    ±    ²    ³    ´    µ    ¶    ·    ¸    ¹    º    »    ¼    ½    ¾    ¿
        400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        // À    Á    Â    Ã    Ä    Å    Æ     Ç    È    É    Ê    Ë    Ì    Í    Î    Ï
        667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        // Ð    Ñ    Ò    Ó    Ô    Õ    Ö    ×    Ø    Ù    Ú    Û    Ü    Ý    Þ    ß
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        // à    á    â    ã    ä    å    æ    ç    è    é    ê    ë    ì    í    î    ï
        556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
        // ð    ñ    ò    ó    ô    õ    ö    ÷    ø    ù    ú    û    ü    ý    þ    ÿ
        556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
    ],
    ascender: 718,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    #[rustfmt::skip]
    upper: [
        // €    -    ‚    ƒ    „    …     †    ‡    ˆ    ‰     Š    ‹    Œ     -    Ž    -
        556, 0,   278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0,   611, 0,
        // -    ‘    ’    “    ”    •    –    —     ˜    ™     š    ›    œ    -    ž    Ÿ
        0,   278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0,   500, 667,
        // nbsp ¡    ¢    £    ¤    ¥    ¦    §    ¨    ©    ª    «    ¬    shy  ®    ¯
        278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        // °    ±    ²    ³    ´    µ    ¶    ·    ¸    ¹    º    »    ¼    ½    ¾    ¿
        400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        // À    Á    Â    Ã    Ä    Å    Æ     Ç    È    É    Ê    Ë    Ì    Í    Î    Ï
        722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        // Ð    Ñ    Ò    Ó    Ô    Õ    Ö    ×    Ø    Ù    Ú    Û    Ü    Ý    Þ    ß
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        // à    á    â    ã    ä    å    æ    ç    è    é    ê    ë    ì    í    î    ï
        556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
        // ð    ñ    ò    ó    ô    õ    ö    ÷    ø    ù    ú    û    ü    ý    þ    ÿ
        611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
    ],
    ascender: 718,
};

/// Courier is monospaced: every defined WinAnsi glyph is 600 units.
const COURIER_UPPER: [u16; 128] = {
    let mut upper = [600; 128];
    upper[0x01] = 0;
    upper[0x0D] = 0;
    upper[0x0F] = 0;
    upper[0x10] = 0;
    upper[0x1D] = 0;
    upper
};

static COURIER_TABLE: FontMetricTable = FontMetricTable {
    widths: [600; 95],
    upper: COURIER_UPPER,
    ascender: 629,
};

static COURIER_BOLD_TABLE: FontMetricTable = FontMetricTable {
    widths: [600; 95],
    upper: COURIER_UPPER,
    ascender: 629,
};

/// Returns the static metric table for a font family and weight.
pub fn get_metrics(family: FontFamily, bold: bool) -> &'static FontMetricTable {
    match (family, bold) {
        (FontFamily::Helvetica, false) => &HELVETICA_TABLE,
        (FontFamily::Helvetica, true) => &HELVETICA_BOLD_TABLE,
        (FontFamily::Courier, false) => &COURIER_TABLE,
        (FontFamily::Courier, true) => &COURIER_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        let metrics = get_metrics(FontFamily::Helvetica, false);
        assert_eq!(metrics.measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(FontFamily::Helvetica, false);
        // "Rust" = R(722) + u(556) + s(500) + t(278) = 2056
        let width = metrics.measure_str("Rust");
        assert!((width - 2.056).abs() < 1e-4, "got {width}");
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let regular = get_metrics(FontFamily::Helvetica, false);
        let bold = get_metrics(FontFamily::Helvetica, true);
        assert!(bold.measure_str("library") > regular.measure_str("library"));
    }

    #[test]
    fn test_win_ansi_glyphs_use_their_own_widths() {
        let metrics = get_metrics(FontFamily::Helvetica, true);
        assert!((metrics.measure_str("—") - 1.0).abs() < 1e-4);
        assert!((metrics.measure_str("Æ") - 1.0).abs() < 1e-4);
        assert!((metrics.measure_str("‰") - 1.0).abs() < 1e-4);
        assert!((metrics.measure_str("é") - 0.556).abs() < 1e-4);
        assert!((metrics.measure_str("’") - 0.278).abs() < 1e-4);
    }

    #[test]
    fn test_unencodable_characters_measure_as_question_mark() {
        let metrics = get_metrics(FontFamily::Helvetica, true);
        assert_eq!(metrics.measure_str("日本"), metrics.measure_str("??"));
        assert_eq!(metrics.measure_str("\t"), metrics.measure_str("?"));
    }

    #[test]
    fn test_win_ansi_code() {
        assert_eq!(win_ansi_code('A'), Some(b'A'));
        assert_eq!(win_ansi_code('é'), Some(0xE9));
        assert_eq!(win_ansi_code('€'), Some(0x80));
        assert_eq!(win_ansi_code('—'), Some(0x97));
        assert_eq!(win_ansi_code('Ÿ'), Some(0x9F));
        assert_eq!(win_ansi_code('\u{81}'), None);
        assert_eq!(win_ansi_code('日'), None);
    }

    #[test]
    fn test_every_encodable_character_has_a_width() {
        for table in [
            get_metrics(FontFamily::Helvetica, false),
            get_metrics(FontFamily::Helvetica, true),
            get_metrics(FontFamily::Courier, false),
            get_metrics(FontFamily::Courier, true),
        ] {
            for c in (0x20u32..=0x2FF).chain(0x2000..=0x2200).filter_map(char::from_u32) {
                if win_ansi_code(c).is_some() {
                    assert!(table.measure_str(&c.to_string()) > 0.0, "no width for {c:?}");
                }
            }
        }
    }

    #[test]
    fn test_wrapped_win_ansi_lines_fit_the_cell() {
        let metrics = get_metrics(FontFamily::Helvetica, true);
        let lines = metrics.wrap_to_width("———————", 1.0, 13.0);
        // 13pt em dashes are 0.18in wide: five fit in an inch.
        assert_eq!(lines, vec!["—————", "——"]);

        let text = "Œuvres — Æsop’s “Fables” … ÉTÉ ‰ ÀÂÄÅ ÐÑÒÓ ßÿ";
        for width_in in [0.5, 1.0, 1.9] {
            for line in metrics.wrap_to_width(text, width_in, 13.0) {
                let chars = line.chars().count();
                assert!(
                    chars == 1 || metrics.measure_in(&line, 13.0) <= width_in + 1e-5,
                    "{line:?} is wider than {width_in}in"
                );
            }
        }
    }

    #[test]
    fn test_courier_is_monospace() {
        let metrics = get_metrics(FontFamily::Courier, false);
        assert_eq!(metrics.measure_str("iiii"), metrics.measure_str("WWWW"));
        // 10 chars × 0.6em × 12pt = 72pt = 1in
        let width = metrics.measure_in("0123456789", 12.0);
        assert!((width - 1.0).abs() < 1e-5, "got {width}");
    }

    #[test]
    fn test_wrap_empty_text_yields_no_lines() {
        let metrics = get_metrics(FontFamily::Helvetica, true);
        assert!(metrics.wrap_to_width("", 1.0, 13.0).is_empty());
        assert!(metrics.wrap_to_width("   ", 1.0, 13.0).is_empty());
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let metrics = get_metrics(FontFamily::Helvetica, true);
        assert_eq!(metrics.wrap_to_width("FIC", 1.0, 13.0), vec!["FIC"]);
    }

    #[test]
    fn test_wrap_uses_glyph_widths_not_char_counts() {
        // Courier 12pt fits exactly 10 characters per inch.
        let metrics = get_metrics(FontFamily::Courier, false);
        let lines = metrics.wrap_to_width("abcd efgh ijkl", 1.0, 12.0);
        assert_eq!(lines, vec!["abcd efgh", "ijkl"]);

        // The same text in Helvetica is narrower and fits on one line.
        let helvetica = get_metrics(FontFamily::Helvetica, false);
        assert_eq!(helvetica.wrap_to_width("iiii iiii iiii", 1.0, 12.0).len(), 1);
    }

    #[test]
    fn test_wrap_honours_explicit_newlines() {
        let metrics = get_metrics(FontFamily::Helvetica, true);
        let lines = metrics.wrap_to_width("FIC\nSMI", 1.0, 13.0);
        assert_eq!(lines, vec!["FIC", "SMI"]);
    }

    #[test]
    fn test_wrap_keeps_blank_line_between_paragraphs() {
        let metrics = get_metrics(FontFamily::Helvetica, false);
        let lines = metrics.wrap_to_width("A\n\nB", 2.0, 10.0);
        assert_eq!(lines, vec!["A", "", "B"]);
    }

    #[test]
    fn test_wrap_breaks_over_long_word() {
        let metrics = get_metrics(FontFamily::Courier, false);
        let lines = metrics.wrap_to_width("abcdefghijklmno", 1.0, 12.0);
        assert_eq!(lines, vec!["abcdefghij", "klmno"]);
    }

    #[test]
    fn test_wrap_broken_word_tail_shares_line() {
        let metrics = get_metrics(FontFamily::Courier, false);
        let lines = metrics.wrap_to_width("abcdefghijklm no", 1.0, 12.0);
        assert_eq!(lines, vec!["abcdefghij", "klm no"]);
    }

    #[test]
    fn test_every_wrapped_line_fits() {
        let metrics = get_metrics(FontFamily::Helvetica, false);
        let text = "The quick brown fox jumps over the lazy dog near the riverbank";
        for line in metrics.wrap_to_width(text, 1.9, 10.0) {
            assert!(metrics.measure_in(&line, 10.0) <= 1.9 + 1e-5, "line too wide: {line}");
        }
    }

    #[test]
    fn test_base_font_names() {
        assert_eq!(FontFamily::Helvetica.base_font_name(true), "Helvetica-Bold");
        assert_eq!(FontFamily::Courier.base_font_name(false), "Courier");
    }
}
