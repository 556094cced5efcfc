//! # Layout Tree
//!
//! The declarative half of the engine: columns hold components, rows hold
//! columns, pages hold rows. Nothing here knows about page capacity; that
//! is the paginator's job (see [`page_break`]).
//!
//! A row is validated against its grid when it is built. Its height is
//! either fixed or resolved from its components when it is placed, using
//! the column widths the grid gives them.

pub mod grid;
pub mod page_break;

use std::sync::Arc;

use crate::components::{Component, LayoutContext};
use crate::config::DEFAULT_GRID_SIZE;
use crate::error::{Error, Result};
use crate::style::CellProps;

/// A column: components stacked in one grid slot.
#[derive(Debug, Clone, Default)]
pub struct Col {
    size: Option<usize>,
    components: Vec<Arc<dyn Component>>,
    style: Option<CellProps>,
}

impl Col {
    /// A column spanning `size` grid units.
    pub fn new(size: usize) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    /// A column sharing the units its sized siblings leave over.
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn add(self, component: impl Component + 'static) -> Self {
        self.add_shared(Arc::new(component))
    }

    pub fn add_shared(mut self, component: Arc<dyn Component>) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_style(mut self, style: CellProps) -> Self {
        self.style = Some(style);
        self
    }

    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn is_auto(&self) -> bool {
        self.size.is_none()
    }

    pub fn components(&self) -> &[Arc<dyn Component>] {
        &self.components
    }

    pub fn style(&self) -> Option<&CellProps> {
        self.style.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowHeight {
    Fixed(f64),
    /// Tallest component at its column width.
    Auto,
}

/// A validated row of columns.
#[derive(Debug, Clone)]
pub struct Row {
    height: RowHeight,
    cols: Vec<Col>,
    units: Vec<f64>,
    grid: usize,
}

impl Row {
    /// Fixed-height row on the default 12-unit grid.
    pub fn new(height: f64, cols: Vec<Col>) -> Result<Self> {
        Self::builder().height(height).cols(cols).build()
    }

    /// Auto-height row on the default 12-unit grid.
    pub fn auto(cols: Vec<Col>) -> Result<Self> {
        Self::builder().auto().cols(cols).build()
    }

    pub fn builder() -> RowBuilder {
        RowBuilder::default()
    }

    pub fn height(&self) -> RowHeight {
        self.height
    }

    pub fn cols(&self) -> &[Col] {
        &self.cols
    }

    /// Grid units each column occupies, after auto columns are resolved.
    pub fn units(&self) -> &[f64] {
        &self.units
    }

    pub fn grid_size(&self) -> usize {
        self.grid
    }

    pub fn col_widths(&self, usable_width: f64) -> Vec<f64> {
        grid::column_widths(&self.units, self.grid, usable_width)
    }

    /// The height this row occupies on a page.
    pub fn resolve_height(&self, ctx: &LayoutContext<'_>, usable_width: f64) -> f64 {
        match self.height {
            RowHeight::Fixed(height) => height,
            RowHeight::Auto => self
                .cols
                .iter()
                .zip(self.col_widths(usable_width))
                .flat_map(|(col, width)| col.components.iter().map(move |c| (c, width)))
                .map(|(component, width)| component.height(ctx, width))
                .filter(|h| h.is_finite())
                .fold(0.0, f64::max),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RowBuilder {
    height: RowHeight,
    grid: usize,
    cols: Vec<Col>,
}

impl Default for RowBuilder {
    fn default() -> Self {
        Self {
            height: RowHeight::Auto,
            grid: DEFAULT_GRID_SIZE,
            cols: Vec::new(),
        }
    }
}

impl RowBuilder {
    pub fn height(mut self, height: f64) -> Self {
        self.height = RowHeight::Fixed(height);
        self
    }

    pub fn auto(mut self) -> Self {
        self.height = RowHeight::Auto;
        self
    }

    pub fn grid_size(mut self, grid: usize) -> Self {
        self.grid = grid;
        self
    }

    pub fn col(mut self, col: Col) -> Self {
        self.cols.push(col);
        self
    }

    pub fn cols(mut self, cols: impl IntoIterator<Item = Col>) -> Self {
        self.cols.extend(cols);
        self
    }

    pub fn build(self) -> Result<Row> {
        if let RowHeight::Fixed(height) = self.height {
            if !height.is_finite() || height < 0.0 {
                return Err(Error::config(format!(
                    "row height must be finite and non-negative, got {}",
                    height
                )));
            }
        }
        let sizes: Vec<Option<usize>> = self.cols.iter().map(Col::size).collect();
        let units = grid::resolve_units(&sizes, self.grid)?;
        Ok(Row {
            height: self.height,
            cols: self.cols,
            units,
            grid: self.grid,
        })
    }
}

/// A caller-assembled page. Added pages always start on a fresh page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    rows: Vec<Row>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
