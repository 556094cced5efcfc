//! # Document Model
//!
//! Geometry and document-level attributes shared by the layout engine,
//! the structure builder and the rendering providers.
//!
//! Every length is in millimetres. The page is described by a paper size
//! plus an orientation; the usable content rectangle is what remains after
//! subtracting the margins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Width × height of the whole page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns portrait (width, height) in millimetres.
    pub fn dimensions(&self) -> Dimensions {
        match self {
            PageSize::A3 => Dimensions::new(297.0, 420.0),
            PageSize::A4 => Dimensions::new(210.0, 297.0),
            PageSize::A5 => Dimensions::new(148.0, 210.0),
            PageSize::Letter => Dimensions::new(215.9, 279.4),
            PageSize::Legal => Dimensions::new(215.9, 355.6),
            PageSize::Tabloid => Dimensions::new(279.4, 431.8),
            PageSize::Custom { width, height } => Dimensions::new(*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Apply this orientation to portrait dimensions.
    pub fn apply(&self, dims: Dimensions) -> Dimensions {
        match self {
            Orientation::Portrait => dims,
            Orientation::Landscape => Dimensions::new(dims.height, dims.width),
        }
    }
}

/// Page margins (left, top, right, bottom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

impl Margins {
    pub fn uniform(v: f64) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    fn all(&self) -> [f64; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.all().iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// A resolved rectangle on the page, in millimetres from the top-left corner.
///
/// Cells are computed by the engine from grid position and accumulated row
/// offsets; components only ever receive them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Cell {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Image encodings understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    Jpg,
    Jpeg,
    Png,
}

impl Extension {
    /// Derive the extension from the suffix of a path-like key.
    pub fn from_key(key: &str) -> Result<Self, Error> {
        if let Some(rest) = key.strip_prefix("data:image/") {
            let mime = rest.split([';', ',']).next().unwrap_or("");
            return mime.parse();
        }
        let path = key.split(['?', '#']).next().unwrap_or(key);
        let suffix = path.rsplit_once('.').map(|(_, s)| s).unwrap_or("");
        suffix.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::Jpg => "jpg",
            Extension::Jpeg => "jpeg",
            Extension::Png => "png",
        }
    }

    pub fn is_jpeg(&self) -> bool {
        matches!(self, Extension::Jpg | Extension::Jpeg)
    }
}

impl FromStr for Extension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" => Ok(Extension::Jpg),
            "jpeg" => Ok(Extension::Jpeg),
            "png" => Ok(Extension::Png),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document metadata embedded in the Info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<chrono::NaiveDateTime>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.creator.is_none()
            && self.keywords.is_none()
            && self.creation_date.is_none()
    }
}

/// What a reader may do with a protected document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    #[default]
    Print,
    Modify,
    Copy,
    AnnotForms,
}

impl Permission {
    /// Permission bit as laid out in the standard security handler's /P entry.
    pub fn flag(&self) -> i32 {
        match self {
            Permission::Print => 4,
            Permission::Modify => 8,
            Permission::Copy => 16,
            Permission::AnnotForms => 32,
        }
    }
}

/// Password protection applied by the provider before serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protection {
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub user_password: String,
    #[serde(default)]
    pub owner_password: String,
}

/// Where the page number is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageNumberPlace {
    Top,
    #[default]
    Bottom,
}

/// Page numbering drawn on every page by the renderer.
///
/// `pattern` may contain `{current}` and `{total}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNumber {
    #[serde(default = "default_page_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub place: PageNumberPlace,
    #[serde(default = "default_page_number_size")]
    pub size: f64,
}

fn default_page_pattern() -> String {
    "{current} / {total}".to_string()
}

fn default_page_number_size() -> f64 {
    8.0
}

impl Default for PageNumber {
    fn default() -> Self {
        Self {
            pattern: default_page_pattern(),
            place: PageNumberPlace::default(),
            size: default_page_number_size(),
        }
    }
}

impl PageNumber {
    pub fn render(&self, current: usize, total: usize) -> String {
        self.pattern
            .replace("{current}", &current.to_string())
            .replace("{total}", &total.to_string())
    }
}
