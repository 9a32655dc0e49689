//! # Label Rendering
//!
//! Deterministic, cached conversion of text into a raster label image.
//!
//! ## Architecture
//!
//! ```text
//! LabelRequest (trimmed text + symbology)
//!     │
//!     ▼
//! LabelGenerator::generate()   ← single critical section
//!     │ cache hit  → defensive copy of the stored master
//!     │ cache miss → render per symbology, insert, evict LRU
//!     ▼
//! LabelImage (RGB raster)
//! ```
//!
//! The linear symbology (Code 128) is composited centered onto a fixed
//! 600x300 white canvas; the matrix symbology (QR) renders directly at its
//! native module resolution.

mod cache;
mod code128;
mod qr;

use std::io::Cursor;
use std::sync::Mutex;

use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EtiquetaError;
use cache::LruCache;

pub use code128::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Rendered label raster, RGB, dimensions positive by construction.
pub type LabelImage = RgbImage;

/// Default number of rendered labels kept in memory.
pub const CACHE_CAPACITY: usize = 100;

/// The encoding scheme used to represent data visually.
///
/// Serialized as `"barcode"` / `"qrcode"`, the tags used by the durable
/// history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbology {
    /// Linear barcode (Code 128, character set B)
    #[serde(rename = "barcode")]
    Code128,
    /// Two-dimensional matrix code
    #[serde(rename = "qrcode")]
    QrCode,
}

impl Symbology {
    /// Stable tag, matching the on-disk history format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code128 => "barcode",
            Self::QrCode => "qrcode",
        }
    }

    /// Human-readable name for user-facing output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Code128 => "Barcode",
            Self::QrCode => "QR Code",
        }
    }
}

impl Default for Symbology {
    /// History entries written before the symbology tag existed are linear.
    fn default() -> Self {
        Self::Code128
    }
}

/// A validated request to render one label.
///
/// The text is trimmed on construction and guaranteed non-empty; the
/// symbology is fixed for the lifetime of the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelRequest {
    text: String,
    symbology: Symbology,
}

impl LabelRequest {
    /// Build a request, trimming surrounding whitespace.
    ///
    /// ## Errors
    ///
    /// Returns [`EtiquetaError::Encoding`] when the trimmed text is empty.
    pub fn new(text: &str, symbology: Symbology) -> Result<Self, EtiquetaError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EtiquetaError::Encoding(
                "label text cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            text: trimmed.to_string(),
            symbology,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn symbology(&self) -> Symbology {
        self.symbology
    }
}

/// Cache hit/miss counters, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct GeneratorState {
    cache: LruCache<(String, Symbology), LabelImage>,
    stats: CacheStats,
}

/// Renders label images, memoizing results in a bounded LRU cache.
///
/// The cache is shared across concurrent print/preview requests, so all
/// access runs under one mutex; the lock covers render-or-fetch plus
/// eviction and is never held across device calls.
///
/// ## Example
///
/// ```
/// use etiqueta::{LabelGenerator, LabelRequest, Symbology};
///
/// let generator = LabelGenerator::new();
/// let request = LabelRequest::new("INV-0042", Symbology::Code128)?;
/// let image = generator.generate(&request)?;
/// assert!(image.width() > 0);
/// # Ok::<(), etiqueta::EtiquetaError>(())
/// ```
pub struct LabelGenerator {
    state: Mutex<GeneratorState>,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(GeneratorState {
                cache: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Render the label for `request`, or return a copy of the cached image.
    ///
    /// Repeated calls with the same request are pixel-identical; the second
    /// call never re-invokes the underlying renderer. The returned image is
    /// a defensive copy, safe to resize or composite.
    ///
    /// ## Errors
    ///
    /// [`EtiquetaError::Encoding`] when the symbology rejects the text.
    pub fn generate(&self, request: &LabelRequest) -> Result<LabelImage, EtiquetaError> {
        let key = (request.text.clone(), request.symbology);

        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let state = &mut *guard;

        if let Some(image) = state.cache.get(&key) {
            let copy = image.clone();
            state.stats.hits += 1;
            debug!(
                text = %request.text,
                symbology = request.symbology.as_str(),
                "label cache hit"
            );
            return Ok(copy);
        }

        let image = match request.symbology {
            Symbology::Code128 => code128::render(&request.text)?,
            Symbology::QrCode => qr::render(&request.text)?,
        };

        state.stats.misses += 1;
        if let Some((evicted, _)) = state.cache.insert(key, image.clone()) {
            debug!(text = %evicted, "evicted least-recently-used label");
        }

        Ok(image)
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).stats
    }

    /// Number of cached label images.
    pub fn cached_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cache
            .len()
    }
}

impl Default for LabelGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a label image as PNG bytes (for previews and file output).
pub fn to_png(image: &LabelImage) -> Result<Vec<u8>, EtiquetaError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| EtiquetaError::Image(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}
