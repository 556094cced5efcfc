use crate::components::{picture_height, Component, LayoutContext};
use crate::error::Result;
use crate::model::Cell;
use crate::provider::PageSurface;
use crate::structure::StructureNode;
use crate::style::RectProps;

/// A QR code encoding `code`, drawn square.
#[derive(Debug, Clone, PartialEq)]
pub struct QrCode {
    code: String,
    props: RectProps,
}

impl QrCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self::with_props(code, RectProps::default())
    }

    pub fn with_props(code: impl Into<String>, props: RectProps) -> Self {
        Self {
            code: code.into(),
            props,
        }
    }
}

impl Component for QrCode {
    fn height(&self, _ctx: &LayoutContext<'_>, width: f64) -> f64 {
        picture_height(1.0, 1.0, width, &self.props)
    }

    fn render(&self, surface: &mut dyn PageSurface, cell: &Cell, _ctx: &LayoutContext<'_>) -> Result<()> {
        surface.add_qr_code(&self.code, cell, &self.props);
        Ok(())
    }

    fn structure(&self) -> StructureNode {
        StructureNode::new("qrcode")
            .with_value(self.code.as_str())
            .with_detail("props", self.props)
    }
}
