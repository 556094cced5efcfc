//! The generated document.

use std::io;
use std::path::Path;

use base64::Engine;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdf {
    bytes: Vec<u8>,
    pages: usize,
}

impl Pdf {
    pub fn new(bytes: Vec<u8>, pages: usize) -> Self {
        Self { bytes, pages }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Standard-alphabet base64 of the bytes.
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot save to an empty path",
            )));
        }
        std::fs::write(path, &self.bytes)?;
        log::debug!("saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}
