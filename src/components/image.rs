use std::sync::Arc;

use crate::components::{picture_height, Component, LayoutContext};
use crate::error::Result;
use crate::model::Cell;
use crate::provider::PageSurface;
use crate::structure::StructureNode;
use crate::style::RectProps;

/// A picture identified by a key (path, `file://` URL or data URI) and
/// resolved through the image cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    key: String,
    props: RectProps,
}

impl Image {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_props(key, RectProps::default())
    }

    pub fn with_props(key: impl Into<String>, props: RectProps) -> Self {
        Self {
            key: key.into(),
            props,
        }
    }
}

impl Component for Image {
    fn height(&self, ctx: &LayoutContext<'_>, width: f64) -> f64 {
        match ctx.provider.dimensions_by_image(&self.key) {
            Ok(dims) => picture_height(dims.width, dims.height, width, &self.props),
            Err(e) => {
                log::warn!("cannot size image '{}': {}", self.key, e);
                0.0
            }
        }
    }

    fn render(&self, surface: &mut dyn PageSurface, cell: &Cell, _ctx: &LayoutContext<'_>) -> Result<()> {
        surface.add_image_from_file(&self.key, cell, &self.props);
        Ok(())
    }

    fn structure(&self) -> StructureNode {
        // Data URIs would bloat snapshots; record the scheme only.
        let value = if self.key.starts_with("data:") {
            self.key.split(',').next().unwrap_or("data:").to_string()
        } else {
            self.key.clone()
        };
        StructureNode::new("image")
            .with_value(value)
            .with_detail("props", self.props)
    }
}

/// A picture from in-memory bytes. The bytes are shared, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct BytesImage {
    bytes: Arc<[u8]>,
    extension: String,
    props: RectProps,
}

impl BytesImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>, extension: impl Into<String>) -> Self {
        Self::with_props(bytes, extension, RectProps::default())
    }

    pub fn with_props(
        bytes: impl Into<Arc<[u8]>>,
        extension: impl Into<String>,
        props: RectProps,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            extension: extension.into(),
            props,
        }
    }
}

impl Component for BytesImage {
    fn height(&self, ctx: &LayoutContext<'_>, width: f64) -> f64 {
        match ctx
            .provider
            .dimensions_by_image_bytes(&self.bytes, &self.extension)
        {
            Ok(dims) => picture_height(dims.width, dims.height, width, &self.props),
            Err(e) => {
                log::warn!("cannot size {} image bytes: {}", self.extension, e);
                0.0
            }
        }
    }

    fn render(&self, surface: &mut dyn PageSurface, cell: &Cell, _ctx: &LayoutContext<'_>) -> Result<()> {
        surface.add_image_from_bytes(&self.bytes, cell, &self.props, &self.extension);
        Ok(())
    }

    fn structure(&self) -> StructureNode {
        StructureNode::new("bytes_image")
            .with_value(self.extension.as_str())
            .with_detail("bytes", self.bytes.len())
            .with_detail("props", self.props)
    }
}
