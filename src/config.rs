//! # Document Configuration
//!
//! Everything fixed for a document's lifetime: paper, margins, grid, worker
//! count and the provider-level settings (compression, protection, metadata).
//!
//! A `Config` is either built programmatically through [`ConfigBuilder`] or
//! parsed from JSON with camelCase keys. Both paths end in
//! [`Config::validate`], so an invalid page geometry never reaches layout.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    Dimensions, Extension, Margins, Metadata, Orientation, PageNumber, PageSize, Protection,
};
use crate::style::FontProps;

/// Which rendering backend a document is generated with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    #[default]
    Pdf,
}

/// Image drawn behind the content of every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub bytes: Vec<u8>,
    pub extension: Extension,
}

pub const DEFAULT_GRID_SIZE: usize = 12;

fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}

fn default_workers() -> usize {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub provider_type: ProviderType,

    #[serde(default)]
    pub page_size: PageSize,

    #[serde(default)]
    pub orientation: Orientation,

    /// Page margins in millimetres.
    #[serde(default)]
    pub margins: Margins,

    /// Render workers. 0 and 1 both mean rendering on the caller's thread.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Number of units a row's width is divided into.
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,

    /// Font applied to text that does not choose its own.
    #[serde(default)]
    pub default_font: FontProps,

    #[serde(default = "default_true")]
    pub compression: bool,

    #[serde(default)]
    pub protection: Option<Protection>,

    #[serde(default)]
    pub metadata: Option<Metadata>,

    #[serde(default)]
    pub page_number: Option<PageNumber>,

    #[serde(default)]
    pub background_image: Option<BackgroundImage>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::Pdf,
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            workers: default_workers(),
            grid_size: DEFAULT_GRID_SIZE,
            default_font: FontProps::default(),
            compression: true,
            protection: None,
            metadata: None,
            page_number: None,
            background_image: None,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Whole-page dimensions after orientation is applied.
    pub fn dimensions(&self) -> Dimensions {
        self.orientation.apply(self.page_size.dimensions())
    }

    pub fn usable_width(&self) -> f64 {
        self.dimensions().width - self.margins.horizontal()
    }

    pub fn usable_height(&self) -> f64 {
        self.dimensions().height - self.margins.vertical()
    }

    pub fn validate(&self) -> Result<()> {
        let dims = self.dimensions();
        if !(dims.width.is_finite() && dims.height.is_finite())
            || dims.width <= 0.0
            || dims.height <= 0.0
        {
            return Err(Error::config(format!(
                "page dimensions must be positive, got {} x {}",
                dims.width, dims.height
            )));
        }
        if !self.margins.is_valid() {
            return Err(Error::config(
                "margins must be finite and non-negative",
            ));
        }
        if self.usable_width() <= 0.0 {
            return Err(Error::config(format!(
                "margins leave no usable width ({} mm page, {} mm of margins)",
                dims.width,
                self.margins.horizontal()
            )));
        }
        if self.usable_height() <= 0.0 {
            return Err(Error::config(format!(
                "margins leave no usable height ({} mm page, {} mm of margins)",
                dims.height,
                self.margins.vertical()
            )));
        }
        if self.grid_size == 0 {
            return Err(Error::config("grid size must be at least 1"));
        }
        if !(self.default_font.size.is_finite() && self.default_font.size > 0.0) {
            return Err(Error::config("default font size must be positive"));
        }
        if let Some(page_number) = &self.page_number {
            if !(page_number.size.is_finite() && page_number.size > 0.0) {
                return Err(Error::config("page number size must be positive"));
            }
        }
        Ok(())
    }
}

/// Programmatic construction of a [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn provider_type(mut self, provider_type: ProviderType) -> Self {
        self.config.provider_type = provider_type;
        self
    }

    pub fn page_size(mut self, page_size: PageSize) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn dimensions(mut self, width: f64, height: f64) -> Self {
        self.config.page_size = PageSize::Custom { width, height };
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.config.orientation = orientation;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.config.margins = margins;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn grid_size(mut self, grid_size: usize) -> Self {
        self.config.grid_size = grid_size;
        self
    }

    pub fn default_font(mut self, font: FontProps) -> Self {
        self.config.default_font = font;
        self
    }

    pub fn compression(mut self, enabled: bool) -> Self {
        self.config.compression = enabled;
        self
    }

    pub fn protection(mut self, protection: Protection) -> Self {
        self.config.protection = Some(protection);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.config.metadata = Some(metadata);
        self
    }

    pub fn page_number(mut self, page_number: PageNumber) -> Self {
        self.config.page_number = Some(page_number);
        self
    }

    pub fn background_image(mut self, bytes: Vec<u8>, extension: Extension) -> Self {
        self.config.background_image = Some(BackgroundImage { bytes, extension });
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
