//! # Page Realization
//!
//! Turns one paginated page into provider calls. The order of drawing is
//! fixed: background image, header rows, body rows, a filler row that
//! pushes the footer to the bottom of the usable area, footer rows, and the
//! page number.
//!
//! Each row is drawn at an absolute position: the top margin plus the
//! heights of every row above it on the same page. The footer sits at the
//! bottom of the usable area, or right below the body when an oversized
//! row runs past it.

pub mod coordinator;

use crate::components::LayoutContext;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::layout::grid;
use crate::layout::page_break::PlacedRow;
use crate::model::{Cell, PageNumberPlace};
use crate::provider::{PageSurface, Provider, RenderedPage};
use crate::style::{Align, RectProps, TextProps};

pub use self::coordinator::RenderCoordinator;

/// Everything shared by all pages of one generation.
pub(crate) struct PageRenderer<'a> {
    pub config: &'a Config,
    pub provider: &'a dyn Provider,
    pub header: &'a [PlacedRow],
    pub footer: &'a [PlacedRow],
}

impl PageRenderer<'_> {
    pub fn render(&self, index: usize, total: usize, rows: &[PlacedRow]) -> Result<RenderedPage> {
        let ctx = LayoutContext {
            provider: self.provider,
            default_font: &self.config.default_font,
        };
        let margins = &self.config.margins;
        let dims = self.config.dimensions();
        let mut surface = self.provider.begin_page(index, self.config);

        if let Some(background) = &self.config.background_image {
            surface.add_background_image_from_bytes(
                &background.bytes,
                &Cell::new(0.0, 0.0, dims.width, dims.height),
                &RectProps::default(),
                background.extension.as_str(),
            );
        }

        let mut y = margins.top;
        for row in self.header.iter().chain(rows) {
            self.render_row(surface.as_mut(), row, y, &ctx)
                .map_err(|e| page_error(index, e))?;
            y += row.height;
        }

        if !self.footer.is_empty() {
            let footer_height: f64 = self.footer.iter().map(|r| r.height).sum();
            // Below an oversized row the footer follows the body instead.
            let footer_top = (margins.top + self.config.usable_height() - footer_height).max(y);
            if footer_top > y {
                surface.create_row(footer_top - y);
                y = footer_top;
            }
            for row in self.footer {
                self.render_row(surface.as_mut(), row, y, &ctx)
                    .map_err(|e| page_error(index, e))?;
                y += row.height;
            }
        }

        self.render_page_number(surface.as_mut(), index, total);

        let page = surface.finish().map_err(|e| page_error(index, e))?;
        log::debug!(
            "rendered page {}/{} ({} bytes of content)",
            index + 1,
            total,
            page.content.len()
        );
        Ok(page)
    }

    fn render_row(
        &self,
        surface: &mut dyn PageSurface,
        placed: &PlacedRow,
        y: f64,
        ctx: &LayoutContext<'_>,
    ) -> Result<()> {
        let widths = placed.row.col_widths(self.config.usable_width());
        let offsets = grid::column_offsets(&widths, self.config.margins.left);

        for ((col, width), x) in placed.row.cols().iter().zip(&widths).zip(offsets) {
            surface.create_col(*width, placed.height, col.style());
            let cell = Cell::new(x, y, *width, placed.height);
            for component in col.components() {
                component.render(surface, &cell, ctx)?;
            }
        }
        surface.create_row(placed.height);
        Ok(())
    }

    fn render_page_number(&self, surface: &mut dyn PageSurface, index: usize, total: usize) {
        let Some(page_number) = &self.config.page_number else {
            return;
        };
        let margins = &self.config.margins;
        let dims = self.config.dimensions();
        let line_height = self.provider.font_height(&crate::style::FontProps {
            size: page_number.size,
            ..self.config.default_font
        });

        let (band_top, band_height) = match page_number.place {
            PageNumberPlace::Top => (0.0, margins.top),
            PageNumberPlace::Bottom => (dims.height - margins.bottom, margins.bottom),
        };
        let props = TextProps {
            size: page_number.size,
            align: Align::Right,
            top: ((band_height - line_height) / 2.0).max(0.0),
            ..TextProps::default().with_default_font(&self.config.default_font)
        };
        let cell = Cell::new(margins.left, band_top, self.config.usable_width(), band_height);
        surface.add_text(&page_number.render(index + 1, total), &cell, &props);
    }
}

fn page_error(index: usize, error: Error) -> Error {
    match error {
        Error::Render { .. } => error,
        other => Error::Render {
            page: index + 1,
            message: other.to_string(),
        },
    }
}
