//! # PDF Page Surface
//!
//! Records the drawing operators of one page. Positions arrive in
//! millimetres from the top-left corner and are converted here to PDF
//! user space (points, origin bottom-left).
//!
//! Images are numbered per page (`/Im0`, `/Im1`, ...) and fonts use fixed
//! resource names, so a page's content is the same no matter which worker
//! rendered it or in what order.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::cache::ImageCache;
use crate::config::Config;
use crate::error::Result;
use crate::image_loader::{self, LoadedImage};
use crate::model::{Cell, Extension};
use crate::pdf::metrics::{self, MM_PER_PT};
use crate::pdf::encode_text;
use crate::provider::{PageSurface, RenderedPage};
use crate::style::{
    Align, BorderType, CellProps, Color, FontFamily, FontStyle, LineOrientation, LineProps,
    LineStyle, RectProps, TextProps,
};

pub(crate) const MSG_PARSE_IMAGE: &str = "could not parse image bytes";
pub(crate) const MSG_ADD_IMAGE: &str = "could not add image to document";
pub(crate) const MSG_LOAD_IMAGE: &str = "could not load image";
pub(crate) const MSG_QR: &str = "could not generate qrcode";

/// Share of the font size above the baseline.
const ASCENT: f64 = 0.8;

pub struct PdfSurface {
    index: usize,
    width: f64,
    height: f64,
    left_margin: f64,
    cursor_x: f64,
    cursor_y: f64,
    cache: Arc<ImageCache>,
    content: String,
    fonts: BTreeSet<(FontFamily, FontStyle)>,
    images: Vec<LoadedImage>,
}

impl PdfSurface {
    pub fn new(index: usize, config: &Config, cache: Arc<ImageCache>) -> Self {
        let dims = config.dimensions();
        Self {
            index,
            width: dims.width,
            height: dims.height,
            left_margin: config.margins.left,
            cursor_x: config.margins.left,
            cursor_y: config.margins.top,
            cache,
            content: String::new(),
            fonts: BTreeSet::new(),
            images: Vec::new(),
        }
    }

    fn pt(mm: f64) -> f64 {
        mm / MM_PER_PT
    }

    /// Convert a top-left based y in millimetres to PDF points.
    fn y_pt(&self, y: f64) -> f64 {
        Self::pt(self.height - y)
    }

    fn write_fill_color(&mut self, c: &Color) {
        let _ = writeln!(self.content, "{:.3} {:.3} {:.3} rg", c.r, c.g, c.b);
    }

    fn write_stroke_color(&mut self, c: &Color) {
        let _ = writeln!(self.content, "{:.3} {:.3} {:.3} RG", c.r, c.g, c.b);
    }

    fn write_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let _ = writeln!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} re",
            Self::pt(x),
            self.y_pt(y + h),
            Self::pt(w),
            Self::pt(h)
        );
    }

    fn write_segment(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let _ = writeln!(
            self.content,
            "{:.2} {:.2} m {:.2} {:.2} l S",
            Self::pt(x0),
            self.y_pt(y0),
            Self::pt(x1),
            self.y_pt(y1)
        );
    }

    /// One text object, one `Tj` per line, no wrapping.
    fn write_lines(&mut self, lines: &[String], cell: &Cell, props: &TextProps) {
        if lines.is_empty() {
            return;
        }
        let available = (cell.width - props.left - props.right).max(0.0);
        self.fonts.insert((props.family, props.style));
        let font = metrics::resource_name(props.family, props.style);
        let line_height = metrics::font_height(props.size);

        let _ = writeln!(self.content, "BT");
        self.write_fill_color(&props.color);
        let _ = writeln!(self.content, "/{} {:.2} Tf", font, props.size);
        for (i, line) in lines.iter().enumerate() {
            let line_width = metrics::string_width(line, props.family, props.style, props.size);
            let x = match props.align {
                Align::Left => cell.x + props.left,
                Align::Center => cell.x + props.left + (available - line_width) / 2.0,
                Align::Right => cell.x + cell.width - props.right - line_width,
            };
            let baseline = cell.y
                + props.top
                + i as f64 * (line_height + props.vertical_padding)
                + line_height * ASCENT;
            let _ = writeln!(
                self.content,
                "1 0 0 1 {:.2} {:.2} Tm ({}) Tj",
                Self::pt(x),
                self.y_pt(baseline),
                encode_text(line)
            );
        }
        let _ = writeln!(self.content, "ET");
    }

    fn inline_error(&mut self, message: &str, cell: &Cell) {
        log::warn!("page {}: {}", self.index + 1, message);
        self.write_lines(&[message.to_string()], cell, &TextProps::error());
    }

    /// Where a picture of the given pixel size lands inside `cell`.
    fn picture_rect(width_px: u32, height_px: u32, cell: &Cell, props: &RectProps) -> Option<Cell> {
        if width_px == 0 || height_px == 0 {
            return None;
        }
        let ratio = height_px as f64 / width_px as f64;
        let fraction = props.percent_fraction();

        let rect = if props.center {
            let mut w = cell.width * fraction;
            let mut h = w * ratio;
            if h > cell.height * fraction {
                h = cell.height * fraction;
                w = h / ratio;
            }
            Cell::new(
                cell.x + (cell.width - w) / 2.0,
                cell.y + (cell.height - h) / 2.0,
                w,
                h,
            )
        } else {
            let mut w = (cell.width - props.left).max(0.0) * fraction;
            let mut h = w * ratio;
            let max_h = (cell.height - props.top).max(0.0) * fraction;
            if h > max_h {
                h = max_h;
                w = h / ratio;
            }
            Cell::new(cell.x + props.left, cell.y + props.top, w, h)
        };

        let usable = [rect.x, rect.y, rect.width, rect.height]
            .iter()
            .all(|v| v.is_finite())
            && rect.width > 0.0
            && rect.height > 0.0;
        usable.then_some(rect)
    }

    fn place_image(&mut self, image: LoadedImage, rect: &Cell) {
        let name = self.images.len();
        self.images.push(image);
        let _ = writeln!(
            self.content,
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q",
            Self::pt(rect.width),
            Self::pt(rect.height),
            Self::pt(rect.x),
            self.y_pt(rect.y + rect.height),
            name
        );
    }

    fn draw_picture(&mut self, bytes: &[u8], extension: Extension, cell: &Cell, props: &RectProps, stretch: bool) {
        let image = match image_loader::decode_image_bytes(bytes, extension) {
            Ok(image) => image,
            Err(e) => {
                log::debug!("image decode failed: {}", e);
                self.inline_error(MSG_PARSE_IMAGE, cell);
                return;
            }
        };
        let rect = if stretch {
            (cell.width > 0.0 && cell.height > 0.0).then_some(*cell)
        } else {
            Self::picture_rect(image.width_px, image.height_px, cell, props)
        };
        match rect {
            Some(rect) => self.place_image(image, &rect),
            None => self.inline_error(MSG_ADD_IMAGE, cell),
        }
    }

    fn draw_bytes(&mut self, bytes: &[u8], cell: &Cell, props: &RectProps, extension: &str, stretch: bool) {
        match extension.parse::<Extension>() {
            Ok(ext) => self.draw_picture(bytes, ext, cell, props, stretch),
            Err(_) => self.inline_error(MSG_PARSE_IMAGE, cell),
        }
    }
}

impl PageSurface for PdfSurface {
    fn add_text(&mut self, text: &str, cell: &Cell, props: &TextProps) {
        let available = (cell.width - props.left - props.right).max(0.0);
        let lines = metrics::wrap_lines(text, props, available);
        self.write_lines(&lines, cell, props);
    }

    fn add_line(&mut self, cell: &Cell, props: &LineProps) {
        let offset = props.offset_percent.clamp(0.0, 100.0) / 100.0;
        let size = props.size_percent.clamp(0.0, 100.0) / 100.0;

        let _ = writeln!(self.content, "q");
        self.write_stroke_color(&props.color);
        let _ = writeln!(self.content, "{:.2} w", Self::pt(props.thickness));
        if props.style == LineStyle::Dashed {
            let _ = writeln!(self.content, "[3 3] 0 d");
        }
        match props.orientation {
            LineOrientation::Horizontal => {
                let length = cell.width * size;
                let x0 = cell.x + (cell.width - length) / 2.0;
                let y = cell.y + cell.height * offset;
                self.write_segment(x0, y, x0 + length, y);
            }
            LineOrientation::Vertical => {
                let length = cell.height * size;
                let y0 = cell.y + (cell.height - length) / 2.0;
                let x = cell.x + cell.width * offset;
                self.write_segment(x, y0, x, y0 + length);
            }
        }
        let _ = writeln!(self.content, "Q");
    }

    fn add_image_from_file(&mut self, key: &str, cell: &Cell, props: &RectProps) {
        let entry = Extension::from_key(key).and_then(|ext| self.cache.get_or_load(key, ext));
        match entry {
            Ok(entry) => self.draw_picture(&entry.bytes, entry.extension, cell, props, false),
            Err(e) => {
                log::debug!("image '{}' unavailable: {}", key, e);
                self.inline_error(MSG_LOAD_IMAGE, cell);
            }
        }
    }

    fn add_image_from_bytes(&mut self, bytes: &[u8], cell: &Cell, props: &RectProps, extension: &str) {
        self.draw_bytes(bytes, cell, props, extension, false);
    }

    fn add_background_image_from_bytes(
        &mut self,
        bytes: &[u8],
        cell: &Cell,
        props: &RectProps,
        extension: &str,
    ) {
        self.draw_bytes(bytes, cell, props, extension, true);
    }

    fn add_qr_code(&mut self, code: &str, cell: &Cell, props: &RectProps) {
        let qr = match ::qrcode::QrCode::new(code.as_bytes()) {
            Ok(qr) => qr,
            Err(e) => {
                log::debug!("qr encoding failed: {}", e);
                self.inline_error(MSG_QR, cell);
                return;
            }
        };
        let modules = qr.width();
        let Some(rect) = Self::picture_rect(modules as u32, modules as u32, cell, props) else {
            self.inline_error(MSG_QR, cell);
            return;
        };
        let module = rect.width / modules as f64;

        let _ = writeln!(self.content, "q");
        self.write_fill_color(&Color::BLACK);
        for (i, color) in qr.to_colors().iter().enumerate() {
            if *color == ::qrcode::Color::Dark {
                let (row, col) = (i / modules, i % modules);
                self.write_rect(
                    rect.x + col as f64 * module,
                    rect.y + row as f64 * module,
                    module,
                    module,
                );
            }
        }
        let _ = writeln!(self.content, "f\nQ");
    }

    fn create_row(&mut self, height: f64) {
        self.cursor_y += height;
        self.cursor_x = self.left_margin;
    }

    fn create_col(&mut self, width: f64, height: f64, style: Option<&CellProps>) {
        if let Some(style) = style.filter(|s| s.is_visible()) {
            let (x, y) = (self.cursor_x, self.cursor_y);
            let _ = writeln!(self.content, "q");
            if let Some(background) = &style.background_color {
                self.write_fill_color(background);
                self.write_rect(x, y, width, height);
                let _ = writeln!(self.content, "f");
            }
            if style.border_type != BorderType::None {
                self.write_stroke_color(&style.border_color.unwrap_or(Color::BLACK));
                let thickness = if style.border_thickness > 0.0 {
                    style.border_thickness
                } else {
                    0.2
                };
                let _ = writeln!(self.content, "{:.2} w", Self::pt(thickness));
                let (right, bottom) = (x + width, y + height);
                match style.border_type {
                    BorderType::Full => {
                        self.write_rect(x, y, width, height);
                        let _ = writeln!(self.content, "S");
                    }
                    BorderType::Left => self.write_segment(x, y, x, bottom),
                    BorderType::Top => self.write_segment(x, y, right, y),
                    BorderType::Right => self.write_segment(right, y, right, bottom),
                    BorderType::Bottom => self.write_segment(x, bottom, right, bottom),
                    BorderType::None => {}
                }
            }
            let _ = writeln!(self.content, "Q");
        }
        self.cursor_x += width;
    }

    fn finish(self: Box<Self>) -> Result<RenderedPage> {
        Ok(RenderedPage {
            index: self.index,
            width: self.width,
            height: self.height,
            content: self.content.into_bytes(),
            fonts: self.fonts,
            images: self.images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::tests::png_bytes;

    fn surface() -> Box<PdfSurface> {
        Box::new(PdfSurface::new(0, &Config::default(), Arc::new(ImageCache::new())))
    }

    fn content(surface: Box<PdfSurface>) -> String {
        String::from_utf8(surface.finish().unwrap().content).unwrap()
    }

    #[test]
    fn text_registers_font_and_escapes() {
        let mut s = surface();
        s.add_text("a (b)", &Cell::new(10.0, 10.0, 100.0, 10.0), &TextProps::default());
        let page = s.finish().unwrap();
        assert!(page.fonts.contains(&(FontFamily::Helvetica, FontStyle::Normal)));
        let text = String::from_utf8(page.content).unwrap();
        assert!(text.contains("/F1 10.00 Tf"));
        assert!(text.contains("(a \\(b\\)) Tj"));
    }

    #[test]
    fn unknown_extension_renders_inline_error() {
        let mut s = surface();
        s.add_image_from_bytes(&png_bytes(1, 1, 255), &Cell::new(0.0, 0.0, 50.0, 50.0), &RectProps::default(), "jj");
        let text = content(s);
        assert!(text.contains(MSG_PARSE_IMAGE));
    }

    #[test]
    fn invalid_bytes_render_inline_error() {
        let mut s = surface();
        s.add_image_from_bytes(&[1, 2, 3, 4, 5], &Cell::new(0.0, 0.0, 50.0, 50.0), &RectProps::default(), "png");
        assert!(content(s).contains(MSG_PARSE_IMAGE));
    }

    #[test]
    fn zero_area_cell_cannot_take_an_image() {
        let mut s = surface();
        s.add_image_from_bytes(&png_bytes(2, 2, 255), &Cell::new(0.0, 0.0, 0.0, 10.0), &RectProps::default(), "png");
        assert!(content(s).contains(MSG_ADD_IMAGE));
    }

    #[test]
    fn inline_error_is_one_line_in_a_narrow_cell() {
        let mut s = surface();
        s.add_image_from_bytes(&[0u8; 4], &Cell::new(20.0, 20.0, 1.0, 10.0), &RectProps::default(), "png");
        let text = content(s);
        assert_eq!(text.matches(" Tj").count(), 1);
        assert!(text.contains(&format!("({}) Tj", MSG_PARSE_IMAGE)));
    }

    #[test]
    fn image_is_numbered_per_page() {
        let mut s = surface();
        let cell = Cell::new(10.0, 10.0, 40.0, 40.0);
        s.add_image_from_bytes(&png_bytes(2, 1, 255), &cell, &RectProps::default(), "png");
        s.add_image_from_bytes(&png_bytes(2, 1, 255), &cell, &RectProps::centered(50.0), "png");
        let page = s.finish().unwrap();
        assert_eq!(page.images.len(), 2);
        let text = String::from_utf8(page.content).unwrap();
        assert!(text.contains("/Im0 Do"));
        assert!(text.contains("/Im1 Do"));
    }

    #[test]
    fn picture_keeps_aspect_ratio() {
        let rect = PdfSurface::picture_rect(200, 100, &Cell::new(0.0, 0.0, 40.0, 100.0), &RectProps::default()).unwrap();
        assert_eq!(rect.width, 40.0);
        assert_eq!(rect.height, 20.0);

        let centered = PdfSurface::picture_rect(100, 100, &Cell::new(0.0, 0.0, 40.0, 20.0), &RectProps::centered(100.0)).unwrap();
        assert_eq!((centered.width, centered.height), (20.0, 20.0));
        assert_eq!(centered.x, 10.0);
    }

    #[test]
    fn qr_code_draws_modules() {
        let mut s = surface();
        s.add_qr_code("https://example.com", &Cell::new(0.0, 0.0, 30.0, 30.0), &RectProps::default());
        let text = content(s);
        assert!(text.matches(" re").count() > 10);
        assert!(!text.contains(MSG_QR));
    }

    #[test]
    fn col_style_draws_background_and_advances_cursor() {
        let mut s = surface();
        let style = CellProps {
            background_color: Some(Color::from_rgb8(200, 200, 200)),
            border_type: BorderType::Full,
            ..Default::default()
        };
        s.create_col(50.0, 10.0, Some(&style));
        s.create_col(50.0, 10.0, None);
        assert_eq!(s.cursor_x, 110.0);
        s.create_row(10.0);
        assert_eq!((s.cursor_x, s.cursor_y), (10.0, 20.0));
        let text = content(s);
        assert!(text.contains("0.784 0.784 0.784 rg"));
        assert!(text.contains("\nS\n"));
    }
}
