//! Output types returned by the conversion entry points.

use crate::error::TagError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A complete SVG document produced by [`crate::pipeline::rasterize`].
///
/// Immutable once built: the text always holds the declaration, the `<svg>`
/// container, exactly `width × height` rects and the closing tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorDocument {
    width: u32,
    height: u32,
    size: String,
    svg: String,
}

impl VectorDocument {
    pub(crate) fn new(width: u32, height: u32, size: &str, svg: String) -> Self {
        Self {
            width,
            height,
            size: size.to_string(),
            svg,
        }
    }

    /// Grid width in pixels, also the viewBox width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in pixels, also the viewBox height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The size token declared as both `width` and `height`.
    pub fn size(&self) -> &str {
        &self.size
    }

    /// Number of `<rect>` primitives in the document.
    pub fn primitive_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_str(&self) -> &str {
        &self.svg
    }

    pub fn into_string(self) -> String {
        self.svg
    }
}

impl fmt::Display for VectorDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.svg)
    }
}

/// Result of converting one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The image that was read.
    pub source: PathBuf,
    /// The generated document.
    pub document: VectorDocument,
    /// Wall-clock time spent decoding and rasterizing.
    pub duration_ms: u64,
}

/// Outcome for a single file of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResult {
    /// 0-based position within the selection.
    pub index: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Pixel width, 0 when decoding failed.
    pub width: u32,
    /// Pixel height, 0 when decoding failed.
    pub height: u32,
    pub duration_ms: u64,
    /// Set when this file failed; no SVG was written for it.
    pub error: Option<TagError>,
}

impl TagResult {
    pub fn primitive_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Aggregate counters for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub selected_tags: usize,
    pub converted_tags: usize,
    pub failed_tags: usize,
    /// Tags never started because an earlier failure stopped the batch.
    pub skipped_tags: usize,
    pub total_primitives: usize,
    pub total_duration_ms: u64,
}

/// Result of [`crate::convert::convert_batch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Outcomes of the attempted files, sorted by source path.
    pub tags: Vec<TagResult>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// Treat any failed tag as an error.
    pub fn into_result(self) -> Result<Self, crate::error::Tag2SvgError> {
        if self.stats.failed_tags > 0 {
            return Err(crate::error::Tag2SvgError::PartialFailure {
                success: self.stats.converted_tags,
                failed: self.stats.failed_tags,
                total: self.stats.selected_tags,
            });
        }
        Ok(self)
    }
}

/// Image facts reported by [`crate::convert::inspect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Decoder colour type, e.g. `Rgba8`, `L8`.
    pub color_type: String,
    /// Detected container format, e.g. `Png`.
    pub format: String,
    /// Number of rects a conversion would emit.
    pub primitive_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(index: usize, error: Option<TagError>) -> TagResult {
        TagResult {
            index,
            source: PathBuf::from(format!("tag36h11/tag36_11_{index:05}.png")),
            destination: PathBuf::from(format!("out/tag36_11_{index:05}_gen.svg")),
            width: 10,
            height: 10,
            duration_ms: 1,
            error,
        }
    }

    #[test]
    fn document_accessors() {
        let doc = VectorDocument::new(3, 2, "20mm", "<svg/>".into());
        assert_eq!(doc.width(), 3);
        assert_eq!(doc.height(), 2);
        assert_eq!(doc.size(), "20mm");
        assert_eq!(doc.primitive_count(), 6);
        assert_eq!(doc.to_string(), "<svg/>");
        assert_eq!(doc.into_string(), "<svg/>");
    }

    #[test]
    fn into_result_passes_clean_batch() {
        let out = BatchOutput {
            tags: vec![tag(0, None), tag(1, None)],
            stats: BatchStats {
                selected_tags: 2,
                converted_tags: 2,
                ..Default::default()
            },
        };
        assert!(out.into_result().is_ok());
    }

    #[test]
    fn into_result_flags_failures() {
        let out = BatchOutput {
            tags: vec![
                tag(0, None),
                tag(
                    1,
                    Some(TagError::DecodeFailed {
                        path: "x.png".into(),
                        detail: "bad".into(),
                    }),
                ),
            ],
            stats: BatchStats {
                selected_tags: 2,
                converted_tags: 1,
                failed_tags: 1,
                ..Default::default()
            },
        };
        match out.into_result() {
            Err(crate::error::Tag2SvgError::PartialFailure {
                success,
                failed,
                total,
            }) => assert_eq!((success, failed, total), (1, 1, 2)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn tag_result_serialises() {
        let json = serde_json::to_string(&tag(4, None)).unwrap();
        assert!(json.contains("\"index\":4"));
        assert!(json.contains("tag36_11_00004_gen.svg"));
        assert!(json.contains("\"error\":null"));
    }
}
