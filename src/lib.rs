//! # Pagewright
//!
//! A grid-based document composition engine.
//!
//! A document is a sequence of rows. Each row divides the page width into a
//! grid of columns, and each column holds drawable components: text, lines,
//! images, signatures, QR codes, or anything implementing [`Component`].
//!
//! Rows flow *into* pages as they are added. A row either fits in what is
//! left of the current page or moves whole to the next one; a registered
//! header and footer are reserved out of every page and drawn on each.
//!
//! ## Architecture
//!
//! ```text
//! Config + rows (API / JSON config)
//!       ↓
//!   [layout]     : Grid resolution, row heights, page breaks
//!       ↓
//!   [structure]  : Introspection tree (golden-file tests)
//!       ↓
//!   [render]     : Pages realized in parallel through a provider
//!       ↓
//!   [pdf]        : Serialize to PDF bytes
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use pagewright::{Col, Config, Document, Text};
//!
//! # fn main() -> pagewright::Result<()> {
//! let mut doc = Document::new(Config::builder().workers(4).build()?)?;
//! doc.add_row(20.0, vec![Col::new(12).add(Text::new("Hello"))])?;
//! doc.generate()?.save("hello.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod components;
pub mod config;
pub mod document;
pub mod error;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod output;
pub mod pdf;
pub mod provider;
pub mod render;
pub mod structure;
pub mod style;
pub mod testing;

pub use cache::{ImageCache, ImageEntry};
pub use components::{BytesImage, Component, Image, LayoutContext, Line, QrCode, Signature, Text};
pub use config::{Config, ConfigBuilder, ProviderType};
pub use document::Document;
pub use error::{Error, Result};
pub use layout::{Col, Page, Row, RowBuilder};
pub use model::{Cell, Dimensions, Extension, Margins, Metadata, Orientation, PageSize};
pub use output::Pdf;
pub use provider::{PageSurface, Provider, RenderedPage};
pub use structure::StructureNode;
