//! # Components
//!
//! The drawable leaves of the layout tree. A component owns only its
//! semantic properties; its position comes from the `Cell` the engine
//! resolves at render time.
//!
//! Every component answers three questions:
//! - how tall it wants to be at a given column width (for auto rows),
//! - how to draw itself onto a page surface,
//! - what it looks like in the structure tree.
//!
//! Custom components implement [`Component`] and are added to columns like
//! the built-in ones.

mod image;
mod line;
mod qrcode;
mod signature;
mod text;

pub use self::image::{BytesImage, Image};
pub use self::line::Line;
pub use self::qrcode::QrCode;
pub use self::signature::Signature;
pub use self::text::Text;

use std::fmt;

use crate::error::Result;
use crate::model::Cell;
use crate::provider::{PageSurface, Provider};
use crate::structure::StructureNode;
use crate::style::FontProps;

/// What a component may consult while measuring or drawing itself.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub provider: &'a dyn Provider,
    pub default_font: &'a FontProps,
}

impl fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutContext")
            .field("default_font", self.default_font)
            .finish_non_exhaustive()
    }
}

pub trait Component: Send + Sync + fmt::Debug {
    /// Intrinsic height in millimetres for a column `width` millimetres wide.
    ///
    /// Failures (an unreadable image, say) report 0 rather than an error; the
    /// same failure is shown inline when the page is rendered.
    fn height(&self, ctx: &LayoutContext<'_>, width: f64) -> f64;

    fn render(&self, surface: &mut dyn PageSurface, cell: &Cell, ctx: &LayoutContext<'_>) -> Result<()>;

    /// Structure node without the `cell` detail, which the builder adds.
    fn structure(&self) -> StructureNode;
}

/// Height of a picture scaled to fit `width` at its aspect ratio.
pub(crate) fn picture_height(
    width_px: f64,
    height_px: f64,
    width: f64,
    props: &crate::style::RectProps,
) -> f64 {
    if width_px <= 0.0 {
        return 0.0;
    }
    let scaled = width * props.percent_fraction() * height_px / width_px;
    if props.center {
        scaled
    } else {
        scaled + props.top
    }
}
