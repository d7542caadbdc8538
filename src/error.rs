//! Error types for the tag2svg library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Tag2SvgError`] — **Fatal**: the conversion cannot proceed at all
//!   (missing file, undecodable image, zero-sized grid, malformed ID range,
//!   unwritable destination). Returned as `Err(Tag2SvgError)` from the
//!   top-level `convert*` functions.
//!
//! * [`TagError`] — **Non-fatal**: a single file of a batch failed while the
//!   others are fine. Stored inside [`crate::output::TagResult`] so callers
//!   can inspect partial success before deciding whether to abort.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the tag2svg library.
#[derive(Debug, Error)]
pub enum Tag2SvgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The pixel grid cannot be rasterized (zero dimension, missing pixel,
    /// dimension mismatch).
    #[error("Invalid input: {detail}")]
    InvalidInput { detail: String },

    /// Input file or directory was not found at the given path.
    #[error("Tag file not found: '{path}'\nCheck the path exists and is a regular file.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read, but its magic bytes match no supported raster format.
    #[error("File is not a supported image: '{path}'\nFirst bytes: {magic:?}")]
    NotAnImage { path: PathBuf, magic: Vec<u8> },

    /// The image format was recognised but decoding failed.
    #[error("Failed to decode image '{path}': {detail}")]
    DecodeFailed { path: PathBuf, detail: String },

    /// The ID range selected no file in the family directory.
    #[error("No tag files selected from '{dir}' with ID range {range}")]
    NoTagsSelected { dir: PathBuf, range: String },

    // ── Range errors ──────────────────────────────────────────────────────
    /// Batch ID range text does not parse into two integers.
    #[error("Malformed tag ID range '{input}': {reason}\nExpected <start>-<end>, e.g. \"0-10\" or \"3-3\".")]
    MalformedRange { input: String, reason: String },

    // ── Batch errors ──────────────────────────────────────────────────────
    /// Every selected tag failed.
    #[error("All {total} tags failed.\nFirst error: {first_error}")]
    AllTagsFailed { total: usize, first_error: String },

    /// Some tags succeeded but at least one failed.
    #[error("{failed}/{total} tags failed during conversion")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output SVG file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Tag2SvgError {
    pub(crate) fn invalid_input(detail: impl Into<String>) -> Self {
        Tag2SvgError::InvalidInput {
            detail: detail.into(),
        }
    }
}

/// A non-fatal error for a single file of a batch.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum TagError {
    /// The file could not be read or decoded.
    #[error("{path}: decode failed: {detail}")]
    DecodeFailed { path: PathBuf, detail: String },

    /// The decoded grid could not be rasterized.
    #[error("{path}: rasterization failed: {detail}")]
    RasterizeFailed { path: PathBuf, detail: String },

    /// The SVG could not be persisted.
    #[error("{path}: write failed: {detail}")]
    WriteFailed { path: PathBuf, detail: String },
}

impl TagError {
    /// Classify a fatal single-file error into its per-tag counterpart.
    pub(crate) fn from_fatal(source: PathBuf, err: &Tag2SvgError) -> Self {
        match err {
            Tag2SvgError::OutputWriteFailed { path, source: e } => TagError::WriteFailed {
                path: path.clone(),
                detail: e.to_string(),
            },
            Tag2SvgError::InvalidInput { detail } => TagError::RasterizeFailed {
                path: source,
                detail: detail.clone(),
            },
            other => TagError::DecodeFailed {
                path: source,
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = Tag2SvgError::PartialFailure {
            success: 9,
            failed: 1,
            total: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/10"), "got: {msg}");
    }

    #[test]
    fn malformed_range_display() {
        let e = Tag2SvgError::MalformedRange {
            input: "a-b".into(),
            reason: "start is not an integer".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'a-b'"));
        assert!(msg.contains("0-10"));
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = Tag2SvgError::OutputWriteFailed {
            path: PathBuf::from("/nope/out.svg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing dir"),
        };
        assert!(e.to_string().contains("/nope/out.svg"));
        assert!(e.source().is_some());
    }

    #[test]
    fn tag_error_classification() {
        let src = PathBuf::from("tag36h11/tag36_11_00000.png");

        let write = Tag2SvgError::OutputWriteFailed {
            path: PathBuf::from("out/tag36_11_00000_gen.svg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(matches!(
            TagError::from_fatal(src.clone(), &write),
            TagError::WriteFailed { .. }
        ));

        let raster = Tag2SvgError::invalid_input("width must be positive");
        assert!(matches!(
            TagError::from_fatal(src.clone(), &raster),
            TagError::RasterizeFailed { .. }
        ));
        assert!(TagError::from_fatal(src.clone(), &raster)
            .to_string()
            .contains("rasterization failed"));

        let decode = Tag2SvgError::DecodeFailed {
            path: src.clone(),
            detail: "truncated".into(),
        };
        match TagError::from_fatal(src.clone(), &decode) {
            TagError::DecodeFailed { path, detail } => {
                assert_eq!(path, src);
                assert!(detail.contains("truncated"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
