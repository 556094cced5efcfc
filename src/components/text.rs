use crate::components::{Component, LayoutContext};
use crate::error::Result;
use crate::model::Cell;
use crate::provider::PageSurface;
use crate::structure::StructureNode;
use crate::style::TextProps;

/// A block of text, wrapped to the column width.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    content: String,
    props: TextProps,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_props(content, TextProps::default())
    }

    pub fn with_props(content: impl Into<String>, props: TextProps) -> Self {
        Self {
            content: content.into(),
            props,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn resolved_props(&self, ctx: &LayoutContext<'_>) -> TextProps {
        self.props.with_default_font(ctx.default_font)
    }
}

impl Component for Text {
    /// `lines * font height + top + (lines - 1) * vertical padding`
    fn height(&self, ctx: &LayoutContext<'_>, width: f64) -> f64 {
        let props = self.resolved_props(ctx);
        let available = (width - props.left - props.right).max(0.0);
        let lines = ctx.provider.lines_quantity(&self.content, &props, available);
        if lines == 0 {
            return props.top;
        }
        let font_height = ctx.provider.font_height(&props.font());
        lines as f64 * font_height + props.top + (lines - 1) as f64 * props.vertical_padding
    }

    fn render(&self, surface: &mut dyn PageSurface, cell: &Cell, ctx: &LayoutContext<'_>) -> Result<()> {
        surface.add_text(&self.content, cell, &self.resolved_props(ctx));
        Ok(())
    }

    fn structure(&self) -> StructureNode {
        StructureNode::new("text")
            .with_value(self.content.as_str())
            .with_detail("props", self.props)
    }
}
