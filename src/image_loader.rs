//! # Image Loading and Decoding
//!
//! Acquires image bytes from a source key and prepares them for PDF
//! embedding. JPEG images pass through without re-encoding (DCTDecode).
//! PNG images are decoded to RGB pixels with a separate alpha channel for
//! SMask transparency.
//!
//! Byte acquisition sits behind [`ImageFetcher`] so hosts can plug in their
//! own storage; the default fetcher understands filesystem paths, `file://`
//! URLs and `data:image/...;base64,` URIs.

use std::io::Cursor;

use crate::error::{Error, Result};
use crate::model::Extension;

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Source of raw image bytes for keyed images.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Vec<u8>>;
}

/// Reads local files and inline data URIs. Remote URLs are refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFetcher;

impl ImageFetcher for DefaultFetcher {
    fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        if key.starts_with("data:image/") {
            let comma_pos = key
                .find(',')
                .ok_or_else(|| Error::image(key, "invalid data URI: missing comma"))?;
            return base64_decode(&key[comma_pos + 1..]).map_err(|e| Error::image(key, e));
        }

        if key.starts_with("http://") || key.starts_with("https://") {
            return Err(Error::image(key, "remote images are not supported"));
        }

        let path = key.strip_prefix("file://").unwrap_or(key);
        std::fs::read(path).map_err(|e| Error::image(key, format!("failed to read file: {}", e)))
    }
}

fn base64_decode(input: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| format!("base64 decode error: {}", e))
}

/// Decode bytes that claim to be of `extension`.
///
/// The claim is checked against the magic bytes, so a PNG labelled `jpg`
/// fails here rather than producing a broken PDF stream.
pub fn decode_image_bytes(data: &[u8], extension: Extension) -> std::result::Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }

    match extension {
        Extension::Jpg | Extension::Jpeg if is_jpeg(data) => decode_jpeg(data),
        Extension::Png if is_png(data) => decode_png(data),
        _ => Err(format!("data is not a valid {} image", extension)),
    }
}

/// Read pixel dimensions without decoding the pixels.
pub fn read_dimensions(data: &[u8], extension: Extension) -> std::result::Result<(u32, u32), String> {
    let matches_magic = match extension {
        Extension::Jpg | Extension::Jpeg => is_jpeg(data),
        Extension::Png => is_png(data),
    };
    if !matches_magic {
        return Err(format!("data is not a valid {} image", extension));
    }
    image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("format detection error: {}", e))?
        .into_dimensions()
        .map_err(|e| format!("failed to read dimensions: {}", e))
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

fn decode_jpeg(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    let (width, height) = read_dimensions(data, Extension::Jpeg)?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("format detection error: {}", e))?
        .decode()
        .map_err(|e| format!("failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        has_transparency |= pixel[3] != 255;
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: has_transparency.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}
