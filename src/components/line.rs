use crate::components::{Component, LayoutContext};
use crate::error::Result;
use crate::model::Cell;
use crate::provider::PageSurface;
use crate::structure::StructureNode;
use crate::style::{LineOrientation, LineProps};

/// A horizontal or vertical stroke across the cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    props: LineProps,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_props(props: LineProps) -> Self {
        Self { props }
    }
}

impl Component for Line {
    fn height(&self, _ctx: &LayoutContext<'_>, _width: f64) -> f64 {
        match self.props.orientation {
            LineOrientation::Horizontal => self.props.thickness,
            LineOrientation::Vertical => 0.0,
        }
    }

    fn render(&self, surface: &mut dyn PageSurface, cell: &Cell, _ctx: &LayoutContext<'_>) -> Result<()> {
        surface.add_line(cell, &self.props);
        Ok(())
    }

    fn structure(&self) -> StructureNode {
        StructureNode::new("line").with_detail("props", self.props)
    }
}
