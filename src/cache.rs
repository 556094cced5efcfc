//! # Image Resource Cache
//!
//! Keyed store of image payloads consulted when auto-sizing pictures and
//! when embedding them. Entries are immutable once inserted and shared as
//! `Arc`, so render workers read them without holding the lock.
//!
//! Concurrent loads of the same key are not deduplicated; both decode and
//! the last write wins, which is harmless since the entries are equal.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::image_loader::{self, DefaultFetcher, ImageFetcher};
use crate::model::Extension;

/// A cached image: the raw bytes plus their intrinsic pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub bytes: Vec<u8>,
    pub extension: Extension,
    pub width_px: u32,
    pub height_px: u32,
}

type CacheKey = (String, Extension);

pub struct ImageCache {
    entries: RwLock<HashMap<CacheKey, Arc<ImageEntry>>>,
    fetcher: Box<dyn ImageFetcher>,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache").field("len", &self.len()).finish()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCache {
    pub fn new() -> Self {
        Self::with_fetcher(DefaultFetcher)
    }

    pub fn with_fetcher(fetcher: impl ImageFetcher + 'static) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fetcher: Box::new(fetcher),
        }
    }

    /// Pure lookup.
    pub fn get_image(&self, key: &str, extension: Extension) -> Option<Arc<ImageEntry>> {
        // A poisoned lock only means a writer panicked mid-insert; the map
        // itself is still consistent.
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&(key.to_string(), extension)).cloned()
    }

    /// Fetch, decode and insert. On failure the cache is left untouched.
    pub fn load_image(&self, key: &str, extension: Extension) -> Result<()> {
        let bytes = self.fetcher.fetch(key)?;
        let (width_px, height_px) =
            image_loader::read_dimensions(&bytes, extension).map_err(|e| Error::image(key, e))?;

        log::debug!("cached image '{}' ({}x{} px)", key, width_px, height_px);
        let entry = Arc::new(ImageEntry {
            bytes,
            extension,
            width_px,
            height_px,
        });
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert((key.to_string(), extension), entry);
        Ok(())
    }

    /// Lookup, loading once on a miss.
    pub fn get_or_load(&self, key: &str, extension: Extension) -> Result<Arc<ImageEntry>> {
        if let Some(entry) = self.get_image(key, extension) {
            return Ok(entry);
        }
        self.load_image(key, extension)?;
        self.get_image(key, extension)
            .ok_or_else(|| Error::image(key, "image missing from cache after load"))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::tests::png_bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        bytes: Vec<u8>,
        calls: Arc<AtomicUsize>,
    }

    impl ImageFetcher for CountingFetcher {
        fn fetch(&self, _key: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.bytes.clone())
        }
    }

    #[test]
    fn miss_then_hit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = ImageCache::with_fetcher(CountingFetcher {
            bytes: png_bytes(4, 2, 255),
            calls: calls.clone(),
        });

        assert!(cache.get_image("logo.png", Extension::Png).is_none());
        let entry = cache.get_or_load("logo.png", Extension::Png).unwrap();
        assert_eq!((entry.width_px, entry.height_px), (4, 2));

        cache.get_or_load("logo.png", Extension::Png).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn extension_is_part_of_the_key() {
        let cache = ImageCache::with_fetcher(CountingFetcher {
            bytes: png_bytes(1, 1, 255),
            calls: Arc::new(AtomicUsize::new(0)),
        });
        cache.load_image("a.png", Extension::Png).unwrap();
        assert!(cache.get_image("a.png", Extension::Jpg).is_none());
    }

    #[test]
    fn failed_load_leaves_cache_untouched() {
        let cache = ImageCache::with_fetcher(CountingFetcher {
            bytes: vec![0, 1, 2, 3, 4],
            calls: Arc::new(AtomicUsize::new(0)),
        });
        let err = cache.load_image("broken.png", Extension::Png).unwrap_err();
        assert!(matches!(err, Error::Image { ref key, .. } if key == "broken.png"));
        assert!(cache.is_empty());
    }
}
