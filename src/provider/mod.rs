//! # Rendering Provider
//!
//! The narrow capability surface between the composition engine and a
//! drawing backend. The engine never emits bytes itself: it asks a
//! [`Provider`] for metrics while laying out, opens one [`PageSurface`] per
//! page while rendering, and hands the finished pages back to the provider
//! for serialization.
//!
//! ## Geometry
//!
//! Every `Cell` given to a surface is absolute, in millimetres from the
//! top-left corner of the physical page. Alongside the cells, the renderer
//! drives a cursor the way a table writer would: for every row it calls
//! `create_col` once per column (which draws the column decoration at the
//! cursor and advances it horizontally), then `create_row` with the row's
//! height (which moves the cursor down and back to the left margin).

use std::collections::BTreeSet;

use crate::config::Config;
use crate::error::Result;
use crate::image_loader::LoadedImage;
use crate::model::{Cell, Dimensions, Metadata, Protection};
use crate::style::{CellProps, FontFamily, FontProps, FontStyle, LineProps, RectProps, TextProps};

/// Document-level backend. Shared read-only by all render workers.
pub trait Provider: Send + Sync {
    /// Height of one line of text, in millimetres.
    fn font_height(&self, font: &FontProps) -> f64;

    /// Number of lines `text` wraps into inside `width` millimetres.
    fn lines_quantity(&self, text: &str, props: &TextProps, width: f64) -> usize;

    /// Pixel dimensions of a keyed image, loading it into the cache on a miss.
    fn dimensions_by_image(&self, key: &str) -> Result<Dimensions>;

    /// Pixel dimensions of transient image bytes. The cache is not touched.
    fn dimensions_by_image_bytes(&self, bytes: &[u8], extension: &str) -> Result<Dimensions>;

    /// Open a drawing surface for the page at `index` (0-based).
    fn begin_page(&self, index: usize, config: &Config) -> Box<dyn PageSurface + '_>;

    fn set_protection(&mut self, protection: Option<&Protection>);

    fn set_compression(&mut self, enabled: bool);

    fn set_metadata(&mut self, metadata: Option<&Metadata>);

    /// Serialize rendered pages, in the order given, into the final document.
    fn generate_bytes(&self, pages: Vec<RenderedPage>) -> Result<Vec<u8>>;
}

/// Page-local drawing operations. One surface per page, owned by one worker.
///
/// Content-level failures (an undecodable picture, an unencodable QR code)
/// do not abort the page: the surface draws an inline error message instead.
pub trait PageSurface {
    fn add_text(&mut self, text: &str, cell: &Cell, props: &TextProps);

    fn add_line(&mut self, cell: &Cell, props: &LineProps);

    /// Draw a keyed image, resolved through the provider's image cache.
    fn add_image_from_file(&mut self, key: &str, cell: &Cell, props: &RectProps);

    fn add_image_from_bytes(&mut self, bytes: &[u8], cell: &Cell, props: &RectProps, extension: &str);

    /// Like `add_image_from_bytes`, but stretched over the whole cell.
    fn add_background_image_from_bytes(
        &mut self,
        bytes: &[u8],
        cell: &Cell,
        props: &RectProps,
        extension: &str,
    );

    fn add_qr_code(&mut self, code: &str, cell: &Cell, props: &RectProps);

    /// Close the current row: move the cursor down by `height` and back to
    /// the left margin.
    fn create_row(&mut self, height: f64);

    /// Draw the decoration of a column at the cursor and advance it by `width`.
    fn create_col(&mut self, width: f64, height: f64, style: Option<&CellProps>);

    fn finish(self: Box<Self>) -> Result<RenderedPage>;
}

/// The page-local result of rendering, ready for serialization.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// 0-based position in the document.
    pub index: usize,
    /// Page size in millimetres.
    pub width: f64,
    pub height: f64,
    /// Uncompressed drawing operators.
    pub content: Vec<u8>,
    /// Fonts referenced by `content`.
    pub fonts: BTreeSet<(FontFamily, FontStyle)>,
    /// Images referenced by `content`, in resource order (`/Im0`, `/Im1`, ...).
    pub images: Vec<LoadedImage>,
}
