#![forbid(unsafe_code)]

//! Label measurement.
//!
//! Layout needs the rendered pixel width of every label. The measuring
//! backend is pluggable through [`LabelMetrics`]; a browser host would wrap
//! canvas `measureText`, a native host its shaping engine. Measurements must
//! be deterministic: identical `(text, font)` pairs always yield identical
//! widths.
//!
//! Measurement failures never abort a layout pass. [`measure_or_default`]
//! substitutes a fixed width and logs the failure, since degraded spacing is
//! preferable to a broken render.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHasher;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

/// Default cache capacity for [`CachedMetrics`].
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Font parameters passed to the measuring backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Font size in pixels.
    pub size: f64,
    /// CSS-style family name.
    pub family: String,
}

impl FontSpec {
    pub fn new(size: f64, family: impl Into<String>) -> Self {
        Self {
            size,
            family: family.into(),
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(24.0, "sans-serif")
    }
}

/// A label could not be measured.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureError {
    /// The backend produced NaN, infinity, or a negative width.
    InvalidWidth(f64),
    /// The font size is not a positive finite number.
    InvalidFontSize(f64),
    /// The backend is unavailable (no canvas, font not loaded, ...).
    Unavailable(String),
}

impl fmt::Display for MeasureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWidth(w) => write!(f, "measured width {w} is not a valid length"),
            Self::InvalidFontSize(s) => write!(f, "font size {s} is not a valid length"),
            Self::Unavailable(reason) => write!(f, "text measurement unavailable: {reason}"),
        }
    }
}

impl std::error::Error for MeasureError {}

/// Maps `(text, font)` to a rendered width in pixels.
pub trait LabelMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError>;
}

impl<M: LabelMetrics + ?Sized> LabelMetrics for &M {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError> {
        (**self).measure(text, font)
    }
}

impl<M: LabelMetrics + ?Sized> LabelMetrics for Box<M> {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError> {
        (**self).measure(text, font)
    }
}

fn check_font(font: &FontSpec) -> Result<(), MeasureError> {
    if font.size.is_finite() && font.size > 0.0 {
        Ok(())
    } else {
        Err(MeasureError::InvalidFontSize(font.size))
    }
}

/// Estimates width from Unicode display columns.
///
/// Each column advances `advance_ratio × font.size` pixels; wide (CJK)
/// characters count as two columns. Good enough for headless layout and for
/// hosts without a shaping engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance_ratio: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl LabelMetrics for MonospaceMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError> {
        check_font(font)?;
        let width = text.width() as f64 * self.advance_ratio * font.size;
        if width.is_finite() && width >= 0.0 {
            Ok(width)
        } else {
            Err(MeasureError::InvalidWidth(width))
        }
    }
}

/// Every character advances a fixed number of pixels, independent of font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMetrics {
    pub advance: f64,
}

impl FixedMetrics {
    pub const fn new(advance: f64) -> Self {
        Self { advance }
    }
}

impl LabelMetrics for FixedMetrics {
    fn measure(&self, text: &str, _font: &FontSpec) -> Result<f64, MeasureError> {
        Ok(text.chars().count() as f64 * self.advance)
    }
}

/// Measure a label, substituting `fallback` on failure.
pub fn measure_or_default(
    metrics: &dyn LabelMetrics,
    text: &str,
    font: &FontSpec,
    fallback: f64,
) -> f64 {
    match metrics.measure(text, font) {
        Ok(width) if width.is_finite() && width >= 0.0 => width,
        Ok(width) => {
            debug!(text, width, fallback, "label measurement invalid; using fallback");
            fallback
        }
        Err(err) => {
            debug!(text, error = %err, fallback, "label measurement failed; using fallback");
            fallback
        }
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate in [0.0, 1.0].
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache in front of another [`LabelMetrics`].
///
/// Keys are 64-bit FxHash digests of `(text, font size bits, family)`; the
/// full strings are not stored. Failures are not cached, so a backend that
/// recovers (e.g. a web font finishing loading) is asked again.
///
/// Not thread-safe: the cache uses interior mutability so that `measure`
/// can take `&self`, matching the single-threaded UI model.
#[derive(Debug)]
pub struct CachedMetrics<M> {
    inner: M,
    cache: RefCell<LruCache<u64, f64>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<M: LabelMetrics> CachedMetrics<M> {
    /// Wrap `inner` with a cache of the given capacity (zero becomes one).
    pub fn new(inner: M, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: RefCell::new(LruCache::new(capacity)),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Wrap `inner` with [`DEFAULT_CACHE_CAPACITY`].
    pub fn with_default_capacity(inner: M) -> Self {
        Self::new(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.borrow();
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            size: cache.len(),
            capacity: cache.cap().get(),
        }
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<M: LabelMetrics> LabelMetrics for CachedMetrics<M> {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError> {
        let key = hash_key(text, font);
        if let Some(&width) = self.cache.borrow_mut().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return Ok(width);
        }
        self.misses.set(self.misses.get() + 1);
        let width = self.inner.measure(text, font)?;
        self.cache.borrow_mut().put(key, width);
        Ok(width)
    }
}

#[inline]
fn hash_key(text: &str, font: &FontSpec) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    font.size.to_bits().hash(&mut hasher);
    font.family.hash(&mut hasher);
    hasher.finish()
}
