//! # PDF Provider
//!
//! The built-in rendering backend: a from-scratch PDF 1.7 writer. Pages are
//! drawn independently by [`surface::PdfSurface`] and assembled here, in
//! page order, into the final file.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog
//! 2 0 obj ... endobj  <- page tree
//! ...                 <- fonts, then per page: images, content, page dict
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Fonts are the standard Type1 fonts with WinAnsiEncoding, so nothing is
//! embedded. Object numbering depends only on the pages' content, which
//! makes the output byte-identical across runs and worker counts.

pub mod metrics;
pub mod security;
pub mod surface;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;
use std::sync::Arc;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::cache::ImageCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::image_loader::{self, ImagePixelData, JpegColorSpace, LoadedImage};
use crate::model::{Dimensions, Extension, Metadata, Protection};
use crate::provider::{PageSurface, Provider, RenderedPage};
use crate::style::{FontFamily, FontProps, FontStyle, TextProps};

use self::metrics::MM_PER_PT;
use self::security::SecurityHandler;
use self::surface::PdfSurface;

const PRODUCER: &str = "Pagewright";

/// Backend writing PDF 1.7 through the standard fonts.
#[derive(Debug)]
pub struct PdfProvider {
    cache: Arc<ImageCache>,
    compression: bool,
    protection: Option<Protection>,
    metadata: Option<Metadata>,
}

impl PdfProvider {
    pub fn new(cache: Arc<ImageCache>) -> Self {
        Self {
            cache,
            compression: true,
            protection: None,
            metadata: None,
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }
}

impl Provider for PdfProvider {
    fn font_height(&self, font: &FontProps) -> f64 {
        metrics::font_height(font.size)
    }

    fn lines_quantity(&self, text: &str, props: &TextProps, width: f64) -> usize {
        metrics::wrap_lines(text, props, width).len()
    }

    fn dimensions_by_image(&self, key: &str) -> Result<Dimensions> {
        let extension = Extension::from_key(key)?;
        let entry = match self.cache.get_image(key, extension) {
            Some(entry) => entry,
            None => {
                self.cache.load_image(key, extension)?;
                self.cache
                    .get_image(key, extension)
                    .ok_or_else(|| Error::image(key, "image not found in cache after load"))?
            }
        };
        Ok(Dimensions::new(entry.width_px as f64, entry.height_px as f64))
    }

    fn dimensions_by_image_bytes(&self, bytes: &[u8], extension: &str) -> Result<Dimensions> {
        let extension: Extension = extension.parse()?;
        let (w, h) = image_loader::read_dimensions(bytes, extension)
            .map_err(|e| Error::image("<bytes>", e))?;
        Ok(Dimensions::new(w as f64, h as f64))
    }

    fn begin_page(&self, index: usize, config: &Config) -> Box<dyn PageSurface + '_> {
        Box::new(PdfSurface::new(index, config, Arc::clone(&self.cache)))
    }

    fn set_protection(&mut self, protection: Option<&Protection>) {
        if let Some(protection) = protection {
            self.protection = Some(protection.clone());
        }
    }

    fn set_compression(&mut self, enabled: bool) {
        self.compression = enabled;
    }

    fn set_metadata(&mut self, metadata: Option<&Metadata>) {
        if let Some(metadata) = metadata {
            self.metadata = Some(metadata.clone());
        }
    }

    fn generate_bytes(&self, pages: Vec<RenderedPage>) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(Error::Backend("a document needs at least one page".to_string()));
        }
        let writer = PdfWriter {
            compression: self.compression,
            protection: self.protection.as_ref(),
            metadata: self.metadata.as_ref(),
        };
        Ok(writer.write(&pages))
    }
}

enum PdfObject {
    Dict(String),
    Stream { dict: String, data: Vec<u8> },
}

struct PdfWriter<'a> {
    compression: bool,
    protection: Option<&'a Protection>,
    metadata: Option<&'a Metadata>,
}

impl PdfWriter<'_> {
    fn write(&self, pages: &[RenderedPage]) -> Vec<u8> {
        // Index 0 is the free-list head; 1 = Catalog, 2 = Pages.
        let mut objects: Vec<PdfObject> = vec![
            PdfObject::Dict(String::new()),
            PdfObject::Dict(String::new()),
            PdfObject::Dict(String::new()),
        ];

        let used_fonts: BTreeSet<(FontFamily, FontStyle)> =
            pages.iter().flat_map(|p| p.fonts.iter().copied()).collect();
        let mut font_ids = BTreeMap::new();
        for &(family, style) in &used_fonts {
            font_ids.insert((family, style), objects.len());
            objects.push(PdfObject::Dict(format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                metrics::base_font(family, style)
            )));
        }

        let mut page_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let image_ids: Vec<usize> = page
                .images
                .iter()
                .map(|image| Self::write_image_xobject(&mut objects, image))
                .collect();

            let content_id = objects.len();
            objects.push(self.content_stream(&page.content));

            let fonts = page
                .fonts
                .iter()
                .filter_map(|key| font_ids.get(key).map(|id| (key, id)))
                .map(|(&(family, style), id)| {
                    format!("/{} {} 0 R", metrics::resource_name(family, style), id)
                })
                .collect::<Vec<_>>()
                .join(" ");
            let mut resources = format!("/Font << {} >>", fonts);
            if !image_ids.is_empty() {
                let xobjects = image_ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| format!("/Im{} {} 0 R", i, id))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(resources, " /XObject << {} >>", xobjects);
            }

            page_ids.push(objects.len());
            objects.push(PdfObject::Dict(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width / MM_PER_PT,
                page.height / MM_PER_PT,
                content_id,
                resources
            )));
        }

        objects[1] = PdfObject::Dict("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objects[2] = PdfObject::Dict(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_ids.len()
        ));

        let security = self.protection.map(|protection| {
            let parts: Vec<&[u8]> = objects
                .iter()
                .flat_map(|obj| match obj {
                    PdfObject::Dict(dict) => vec![dict.as_bytes()],
                    PdfObject::Stream { dict, data } => vec![dict.as_bytes(), data.as_slice()],
                })
                .collect();
            SecurityHandler::new(protection, SecurityHandler::file_id(&parts))
        });

        if let Some(handler) = &security {
            for (id, obj) in objects.iter_mut().enumerate() {
                if let PdfObject::Stream { data, .. } = obj {
                    *data = handler.encrypt(id, data);
                }
            }
        }

        let info_id = self.metadata.filter(|m| !m.is_empty()).map(|metadata| {
            let id = objects.len();
            objects.push(PdfObject::Dict(Self::info_dict(metadata, id, security.as_ref())));
            id
        });

        let encrypt_id = security.as_ref().map(|handler| {
            let id = objects.len();
            objects.push(PdfObject::Dict(handler.encrypt_dict()));
            id
        });

        let mut trailer = String::new();
        if let Some(id) = info_id {
            let _ = write!(trailer, " /Info {} 0 R", id);
        }
        if let (Some(id), Some(handler)) = (encrypt_id, &security) {
            let _ = write!(trailer, " /Encrypt {} 0 R /ID {}", id, handler.id_array());
        }

        Self::serialize(&objects, &trailer)
    }

    fn content_stream(&self, content: &[u8]) -> PdfObject {
        if self.compression {
            PdfObject::Stream {
                dict: "/Filter /FlateDecode".to_string(),
                data: compress_to_vec_zlib(content, 6),
            }
        } else {
            PdfObject::Stream {
                dict: String::new(),
                data: content.to_vec(),
            }
        }
    }

    /// Write one image as one or two XObjects. Returns the main XObject ID.
    fn write_image_xobject(objects: &mut Vec<PdfObject>, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                objects.push(PdfObject::Stream {
                    dict: format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                        image.width_px, image.height_px, color_space
                    ),
                    data: data.clone(),
                });
                objects.len() - 1
            }
            ImagePixelData::Decoded { rgb, alpha } => {
                let smask = alpha.as_ref().map(|alpha| {
                    objects.push(PdfObject::Stream {
                        dict: format!(
                            "/Type /XObject /Subtype /Image /Width {} /Height {} \
                             /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                            image.width_px, image.height_px
                        ),
                        data: compress_to_vec_zlib(alpha, 6),
                    });
                    format!(" /SMask {} 0 R", objects.len() - 1)
                });
                objects.push(PdfObject::Stream {
                    dict: format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                        image.width_px,
                        image.height_px,
                        smask.unwrap_or_default()
                    ),
                    data: compress_to_vec_zlib(rgb, 6),
                });
                objects.len() - 1
            }
        }
    }

    fn info_dict(metadata: &Metadata, id: usize, handler: Option<&SecurityHandler>) -> String {
        let string = |value: &str| -> String {
            match handler {
                Some(handler) => format!("<{}>", security::hex(&handler.encrypt(id, &winansi_bytes(value)))),
                None => format!("({})", encode_text(value)),
            }
        };

        let mut info = String::from("<< ");
        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Creator", &metadata.creator),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                let _ = write!(info, "/{} {} ", key, string(value));
            }
        }
        if let Some(date) = &metadata.creation_date {
            let stamp = date.format("D:%Y%m%d%H%M%S").to_string();
            let _ = write!(info, "/CreationDate {} ", string(&stamp));
        }
        let _ = write!(info, "/Producer {} >>", string(PRODUCER));
        info
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(objects: &[PdfObject], trailer_extra: &str) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            match obj {
                PdfObject::Dict(dict) => output.extend_from_slice(dict.as_bytes()),
                PdfObject::Stream { dict, data } => {
                    let sep = if dict.is_empty() { "" } else { " " };
                    let _ = write!(output, "<< {}{}/Length {} >>\nstream\n", dict, sep, data.len());
                    output.extend_from_slice(data);
                    output.extend_from_slice(b"\nendstream");
                }
            }
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R{} >>\nstartxref\n{}\n%%EOF\n",
            objects.len(),
            trailer_extra,
            xref_offset
        );
        output
    }
}

/// Escape a string for a PDF literal, WinAnsi-encoding non-ASCII characters
/// as octal escapes. Unmappable characters become `?`.
pub(crate) fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in winansi_bytes(s) {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

fn winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|ch| unicode_to_winansi(ch).unwrap_or(b'?'))
        .collect()
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// contains special mappings for smart quotes, bullets, dashes, etc.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // Ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91), // Smart quotes
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98),
        0x2122 => Some(0x99), // Trade mark
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}
