use crate::components::{Component, LayoutContext};
use crate::error::Result;
use crate::model::Cell;
use crate::provider::PageSurface;
use crate::structure::StructureNode;
use crate::style::{Align, LineOrientation, SignatureProps, TextProps};

/// A signing line with a centered label underneath.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    label: String,
    props: SignatureProps,
}

impl Signature {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_props(label, SignatureProps::default())
    }

    pub fn with_props(label: impl Into<String>, props: SignatureProps) -> Self {
        Self {
            label: label.into(),
            props,
        }
    }

    fn label_props(&self) -> TextProps {
        let font = self.props.font;
        TextProps {
            family: font.family,
            style: font.style,
            size: font.size,
            color: font.color,
            align: Align::Center,
            ..Default::default()
        }
    }
}

impl Component for Signature {
    fn height(&self, ctx: &LayoutContext<'_>, _width: f64) -> f64 {
        ctx.provider.font_height(&self.props.font) + self.props.safe_padding + self.props.line.thickness
    }

    fn render(&self, surface: &mut dyn PageSurface, cell: &Cell, ctx: &LayoutContext<'_>) -> Result<()> {
        let label_height = ctx.provider.font_height(&self.props.font);
        let line_y = (cell.height - label_height - self.props.safe_padding).max(0.0);

        let mut line = self.props.line;
        line.orientation = LineOrientation::Horizontal;
        line.offset_percent = 100.0;
        surface.add_line(&Cell::new(cell.x, cell.y, cell.width, line_y), &line);

        let label_cell = Cell::new(
            cell.x,
            cell.y + line_y + self.props.safe_padding,
            cell.width,
            label_height,
        );
        surface.add_text(&self.label, &label_cell, &self.label_props());
        Ok(())
    }

    fn structure(&self) -> StructureNode {
        StructureNode::new("signature")
            .with_value(self.label.as_str())
            .with_detail("props", self.props)
    }
}
