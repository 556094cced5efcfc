//! # Standard Font Metrics
//!
//! Advance widths for the standard Type1 fonts, taken from the Adobe AFM
//! files, and the greedy word wrapper built on them. Widths are in
//! thousandths of an em. Times shares the Helvetica table, which keeps
//! measurements slightly generous; Courier is fixed pitch.

use crate::style::{FontFamily, FontStyle, TextProps};

/// Millimetres per point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Width used for characters outside the tables.
const FALLBACK_WIDTH: u16 = 556;

const COURIER_WIDTH: u16 = 600;

/// Helvetica, codepoints 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold, codepoints 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

pub fn is_bold(style: FontStyle) -> bool {
    matches!(style, FontStyle::Bold | FontStyle::BoldItalic)
}

/// Advance width of `ch` in thousandths of an em.
pub fn char_width(family: FontFamily, style: FontStyle, ch: char) -> u16 {
    if family == FontFamily::Courier {
        return COURIER_WIDTH;
    }
    let table = if is_bold(style) {
        &HELVETICA_BOLD
    } else {
        &HELVETICA
    };
    let cp = ch as u32;
    if (32..=126).contains(&cp) {
        table[(cp - 32) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Width of `text` in millimetres at `size` points.
pub fn string_width(text: &str, family: FontFamily, style: FontStyle, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| char_width(family, style, c) as u32).sum();
    units as f64 / 1000.0 * size * MM_PER_PT
}

/// Height of one line in millimetres at `size` points.
pub fn font_height(size: f64) -> f64 {
    size * MM_PER_PT
}

/// Greedy word wrap into lines no wider than `width` millimetres.
///
/// Explicit newlines always break. A word wider than the line is split
/// between characters. Empty text has no lines.
pub fn wrap_lines(text: &str, props: &TextProps, width: f64) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let measure = |s: &str| string_width(s, props.family, props.style, props.size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if measure(&candidate) <= width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if measure(word) <= width {
                line = word.to_string();
            } else {
                for ch in word.chars() {
                    line.push(ch);
                    if measure(&line) > width && line.chars().count() > 1 {
                        line.pop();
                        lines.push(std::mem::take(&mut line));
                        line.push(ch);
                    }
                }
            }
        }
        lines.push(line);
    }
    lines
}

/// PostScript name of the standard font.
pub fn base_font(family: FontFamily, style: FontStyle) -> &'static str {
    match (family, style) {
        (FontFamily::Helvetica, FontStyle::Normal) => "Helvetica",
        (FontFamily::Helvetica, FontStyle::Bold) => "Helvetica-Bold",
        (FontFamily::Helvetica, FontStyle::Italic) => "Helvetica-Oblique",
        (FontFamily::Helvetica, FontStyle::BoldItalic) => "Helvetica-BoldOblique",
        (FontFamily::Times, FontStyle::Normal) => "Times-Roman",
        (FontFamily::Times, FontStyle::Bold) => "Times-Bold",
        (FontFamily::Times, FontStyle::Italic) => "Times-Italic",
        (FontFamily::Times, FontStyle::BoldItalic) => "Times-BoldItalic",
        (FontFamily::Courier, FontStyle::Normal) => "Courier",
        (FontFamily::Courier, FontStyle::Bold) => "Courier-Bold",
        (FontFamily::Courier, FontStyle::Italic) => "Courier-Oblique",
        (FontFamily::Courier, FontStyle::BoldItalic) => "Courier-BoldOblique",
    }
}

/// Fixed resource name (`F1`..`F12`), identical on every page.
pub fn resource_name(family: FontFamily, style: FontStyle) -> String {
    let family_idx = match family {
        FontFamily::Helvetica => 0,
        FontFamily::Times => 1,
        FontFamily::Courier => 2,
    };
    let style_idx = match style {
        FontStyle::Normal => 0,
        FontStyle::Bold => 1,
        FontStyle::Italic => 2,
        FontStyle::BoldItalic => 3,
    };
    format!("F{}", family_idx * 4 + style_idx + 1)
}
