//! Configuration types for tag-to-SVG conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Single-file and batch conversions read
//! the same struct; batch-only knobs (`tag_ids`, `suffix`, `file_prefix`,
//! `concurrency`, `keep_going`) are simply ignored by the single-file path.

use crate::error::Tag2SvgError;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for a tag-to-SVG conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use tag2svg::{ConversionConfig, IdRange};
///
/// let config = ConversionConfig::builder()
///     .size("2in")
///     .tag_ids(IdRange::new(3, 10).unwrap())
///     .concurrency(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.size, "2in");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Edge length written verbatim into the SVG `width`/`height` attributes.
    /// Any CSS length works: "20mm", "2in", "20px". Default: "20mm".
    pub size: String,

    /// Suffix appended to batch output file names (`{stem}_{suffix}.svg`).
    /// Default: "gen".
    pub suffix: String,

    /// Only files whose name starts with this prefix are picked up in batch
    /// mode. Default: "tag".
    pub file_prefix: String,

    /// Inclusive index range into the sorted family directory. Default: 0-10.
    pub tag_ids: IdRange,

    /// Number of files converted concurrently in batch mode.
    /// Default: available CPU parallelism.
    pub concurrency: usize,

    /// Return `Ok` from a batch even when some tags failed. Default: false,
    /// so any failure aborts the invocation with an error.
    pub keep_going: bool,

    /// Create missing parent directories of a single-file output path.
    /// Default: false. Batch mode always creates its output directory.
    pub create_dirs: bool,

    /// Receives per-tag batch events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            size: "20mm".to_string(),
            suffix: "gen".to_string(),
            file_prefix: "tag".to_string(),
            tag_ids: IdRange::default(),
            concurrency: default_concurrency(),
            keep_going: false,
            create_dirs: false,
            progress_callback: None,
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("size", &self.size)
            .field("suffix", &self.suffix)
            .field("file_prefix", &self.file_prefix)
            .field("tag_ids", &self.tag_ids)
            .field("concurrency", &self.concurrency)
            .field("keep_going", &self.keep_going)
            .field("create_dirs", &self.create_dirs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.config.size = size.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.suffix = suffix.into();
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    pub fn tag_ids(mut self, range: IdRange) -> Self {
        self.config.tag_ids = range;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn keep_going(mut self, v: bool) -> Self {
        self.config.keep_going = v;
        self
    }

    pub fn create_dirs(mut self, v: bool) -> Self {
        self.config.create_dirs = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// The size token is not interpreted, but characters that would end the
    /// attribute or start markup are rejected so the document stays
    /// well-formed.
    pub fn build(self) -> Result<ConversionConfig, Tag2SvgError> {
        let c = &self.config;
        if c.size.trim().is_empty() {
            return Err(Tag2SvgError::InvalidConfig("Size must not be empty".into()));
        }
        if let Some(bad) = c.size.chars().find(|ch| matches!(ch, '"' | '<' | '>' | '&')) {
            return Err(Tag2SvgError::InvalidConfig(format!(
                "Size '{}' contains '{}' which cannot appear in an SVG attribute",
                c.size, bad
            )));
        }
        if c.suffix.is_empty() {
            return Err(Tag2SvgError::InvalidConfig("Suffix must not be empty".into()));
        }
        if c.suffix.contains(['/', '\\']) {
            return Err(Tag2SvgError::InvalidConfig(format!(
                "Suffix '{}' must not contain a path separator",
                c.suffix
            )));
        }
        if c.concurrency == 0 {
            return Err(Tag2SvgError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── ID range ─────────────────────────────────────────────────────────────

static RE_ID_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$").unwrap());

/// Inclusive index range into the sorted list of tag files, e.g. `0-10`.
///
/// `"3-3"` selects the single fourth file. Indices past the end of the list
/// are clamped away rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub start: usize,
    pub end: usize,
}

impl Default for IdRange {
    fn default() -> Self {
        Self { start: 0, end: 10 }
    }
}

impl IdRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: usize, end: usize) -> Result<Self, Tag2SvgError> {
        if start > end {
            return Err(Tag2SvgError::MalformedRange {
                input: format!("{start}-{end}"),
                reason: "start must be <= end".into(),
            });
        }
        Ok(Self { start, end })
    }

    /// Select `items[start..=end]`, clamped to the slice length.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start.min(items.len());
        let end = self.end.saturating_add(1).min(items.len());
        &items[start..end.max(start)]
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for IdRange {
    type Err = Tag2SvgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| Tag2SvgError::MalformedRange {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let caps = RE_ID_RANGE
            .captures(s)
            .ok_or_else(|| malformed("expected two non-negative integers separated by '-'"))?;
        let start: usize = caps[1]
            .parse()
            .map_err(|_| malformed("start is out of range"))?;
        let end: usize = caps[2]
            .parse()
            .map_err(|_| malformed("end is out of range"))?;

        if start > end {
            return Err(malformed("start must be <= end"));
        }
        Ok(Self { start, end })
    }
}
