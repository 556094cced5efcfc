//! # Document
//!
//! The public facade: rows go in, pages come out. Rows are paginated as
//! they are added, so the page a row lands on is known immediately and
//! `fits_on_current_page` can be asked at any time.
//!
//! Header and footer rows are not part of the body sequence. Their height
//! is reserved on every page and they are drawn on every page at render
//! time, the footer anchored to the bottom of the usable area.

use std::sync::Arc;
use std::time::Instant;

use crate::cache::ImageCache;
use crate::components::LayoutContext;
use crate::config::{Config, ProviderType};
use crate::error::{Error, Result};
use crate::layout::page_break::{Paginator, PlacedRow};
use crate::layout::{grid, Col, Page, Row, RowHeight};
use crate::model::Cell;
use crate::output::Pdf;
use crate::pdf::PdfProvider;
use crate::provider::Provider;
use crate::render::{PageRenderer, RenderCoordinator};
use crate::structure::StructureNode;

pub struct Document {
    config: Config,
    provider: Box<dyn Provider>,
    header: Vec<PlacedRow>,
    footer: Vec<PlacedRow>,
    paginator: Paginator,
    coordinator: RenderCoordinator,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("config", &self.config)
            .field("header", &self.header.len())
            .field("footer", &self.footer.len())
            .field("pages", &self.paginator.page_count())
            .field("workers", &self.coordinator.workers())
            .finish()
    }
}

impl Document {
    /// A document rendered by the provider the configuration names.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_image_cache(config, Arc::new(ImageCache::new()))
    }

    /// Like [`Document::new`], resolving keyed images through `cache`.
    pub fn with_image_cache(config: Config, cache: Arc<ImageCache>) -> Result<Self> {
        let provider: Box<dyn Provider> = match config.provider_type {
            ProviderType::Pdf => Box::new(PdfProvider::new(cache)),
        };
        Self::with_provider(config, provider)
    }

    /// A document rendered by a caller-supplied backend.
    pub fn with_provider(config: Config, mut provider: Box<dyn Provider>) -> Result<Self> {
        config.validate()?;
        provider.set_compression(config.compression);
        provider.set_protection(config.protection.as_ref());
        provider.set_metadata(config.metadata.as_ref());
        let capacity = config.usable_height();
        let coordinator = RenderCoordinator::new(config.workers);
        Ok(Self {
            config,
            provider,
            header: Vec::new(),
            footer: Vec::new(),
            paginator: Paginator::new(capacity),
            coordinator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn context(&self) -> LayoutContext<'_> {
        LayoutContext {
            provider: self.provider.as_ref(),
            default_font: &self.config.default_font,
        }
    }

    fn resolve(&self, row: Row) -> PlacedRow {
        let height = row.resolve_height(&self.context(), self.config.usable_width());
        PlacedRow { row, height }
    }

    fn place(&mut self, row: Row) {
        let placed = self.resolve(row);
        self.paginator.place(placed);
    }

    /// Append a row of fixed `height`, built on the configured grid.
    pub fn add_row(&mut self, height: f64, cols: Vec<Col>) -> Result<()> {
        let row = Row::builder()
            .height(height)
            .grid_size(self.config.grid_size)
            .cols(cols)
            .build()?;
        self.place(row);
        Ok(())
    }

    /// Append a row as tall as its tallest component.
    pub fn add_auto_row(&mut self, cols: Vec<Col>) -> Result<()> {
        let row = Row::builder()
            .auto()
            .grid_size(self.config.grid_size)
            .cols(cols)
            .build()?;
        self.place(row);
        Ok(())
    }

    pub fn add_rows(&mut self, rows: impl IntoIterator<Item = Row>) -> Result<()> {
        for row in rows {
            self.place(row);
        }
        Ok(())
    }

    /// Append pages. Each one starts on a fresh page; rows that overflow it
    /// continue on the next.
    pub fn add_pages(&mut self, pages: impl IntoIterator<Item = Page>) -> Result<()> {
        for page in pages {
            self.paginator.break_page();
            for row in page.into_rows() {
                self.place(row);
            }
        }
        Ok(())
    }

    /// Would a row of `height` fit without a page break.
    pub fn fits_on_current_page(&self, height: f64) -> bool {
        self.paginator.fits(height)
    }

    pub fn register_header(&mut self, rows: Vec<Row>) -> Result<()> {
        let placed = self.prepare_fixed_rows("header", rows)?;
        let height = total_height(&placed);
        self.reserve(height, total_height(&self.footer))?;
        self.header = placed;
        Ok(())
    }

    pub fn register_footer(&mut self, rows: Vec<Row>) -> Result<()> {
        let placed = self.prepare_fixed_rows("footer", rows)?;
        let height = total_height(&placed);
        self.reserve(total_height(&self.header), height)?;
        self.footer = placed;
        Ok(())
    }

    fn prepare_fixed_rows(&self, what: &str, rows: Vec<Row>) -> Result<Vec<PlacedRow>> {
        if !self.paginator.is_empty() {
            return Err(Error::config(format!(
                "the {} must be registered before the first row",
                what
            )));
        }
        Ok(rows.into_iter().map(|row| self.resolve(row)).collect())
    }

    fn reserve(&mut self, header: f64, footer: f64) -> Result<()> {
        let capacity = self.config.usable_height() - header - footer;
        if capacity <= 0.0 {
            return Err(Error::config(format!(
                "header ({:.2} mm) and footer ({:.2} mm) leave no room on a {:.2} mm page body",
                header,
                footer,
                self.config.usable_height()
            )));
        }
        self.paginator.set_capacity(capacity);
        Ok(())
    }

    /// Number of pages generated so far. Never less than one.
    pub fn page_count(&self) -> usize {
        self.paginator.page_count()
    }

    /// Render every page and serialize the document.
    pub fn generate(&self) -> Result<Pdf> {
        let started = Instant::now();
        let pages = self.paginator.pages();
        let total = pages.len();
        log::info!(
            "generating {} page(s) with {} worker(s)",
            total,
            self.coordinator.workers()
        );

        let renderer = PageRenderer {
            config: &self.config,
            provider: self.provider.as_ref(),
            header: &self.header,
            footer: &self.footer,
        };
        let rendered = self.coordinator.render(&pages, |index, rows| renderer.render(index, total, rows))?;
        let bytes = self.provider.generate_bytes(rendered)?;

        log::info!(
            "generated {} page(s), {} bytes in {:?}",
            total,
            bytes.len(),
            started.elapsed()
        );
        Ok(Pdf::new(bytes, total))
    }

    /// Snapshot of the paginated tree. Never touches the drawing surface.
    pub fn structure(&self) -> StructureNode {
        let dims = self.config.dimensions();
        let mut root = StructureNode::new("document")
            .with_detail("dimensions", dims)
            .with_detail("margins", self.config.margins)
            .with_detail("grid", self.config.grid_size)
            .with_detail("workers", self.config.workers);

        let footer_height = total_height(&self.footer);
        let footer_anchor = self.config.margins.top + self.config.usable_height() - footer_height;

        for (index, rows) in self.paginator.pages().iter().enumerate() {
            let mut page = StructureNode::new("page").with_value(index + 1);
            let mut y = self.config.margins.top;

            if !self.header.is_empty() {
                let mut header = StructureNode::new("header");
                for row in &self.header {
                    header.push(self.row_structure(row, y));
                    y += row.height;
                }
                page.push(header);
            }
            for row in rows {
                page.push(self.row_structure(row, y));
                y += row.height;
            }
            if !self.footer.is_empty() {
                let mut footer = StructureNode::new("footer");
                let mut y = footer_anchor.max(y);
                for row in &self.footer {
                    footer.push(self.row_structure(row, y));
                    y += row.height;
                }
                page.push(footer);
            }
            root.push(page);
        }
        root
    }

    fn row_structure(&self, placed: &PlacedRow, y: f64) -> StructureNode {
        let mut node = StructureNode::new("row").with_value(placed.height);
        if placed.row.height() == RowHeight::Auto {
            node = node.with_detail("auto", true);
        }
        let widths = placed.row.col_widths(self.config.usable_width());
        let offsets = grid::column_offsets(&widths, self.config.margins.left);

        for (((col, units), width), x) in placed
            .row
            .cols()
            .iter()
            .zip(placed.row.units())
            .zip(&widths)
            .zip(offsets)
        {
            let cell = Cell::new(x, y, *width, placed.height);
            let mut col_node = StructureNode::new("col")
                .with_value(*units)
                .with_detail("auto", col.is_auto())
                .with_cell(&cell);
            if let Some(style) = col.style() {
                col_node = col_node.with_detail("style", style);
            }
            for component in col.components() {
                col_node.push(component.structure().with_cell(&cell));
            }
            node.push(col_node);
        }
        node
    }
}

fn total_height(rows: &[PlacedRow]) -> f64 {
    rows.iter().map(|r| r.height).sum()
}
