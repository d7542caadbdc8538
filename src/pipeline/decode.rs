//! Image decoding: raw file bytes → `RgbaImage`.
//!
//! Tag images come in several pixel layouts: palette-indexed PNGs from the
//! upstream generators, 8-bit grey, RGB, or RGBA. Everything is expanded to
//! RGBA8 so the rasterizer sees one layout and transparent cells keep their
//! alpha.

use crate::error::Tag2SvgError;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;
use tracing::debug;

/// Number of leading bytes reported when the format is not recognised.
const MAGIC_LEN: usize = 8;

/// Decode `bytes` into a [`DynamicImage`], reporting the detected format.
///
/// `path` is only used for error messages.
pub fn decode_dynamic(
    path: &Path,
    bytes: &[u8],
) -> Result<(DynamicImage, ImageFormat), Tag2SvgError> {
    let format = image::guess_format(bytes).map_err(|_| Tag2SvgError::NotAnImage {
        path: path.to_path_buf(),
        magic: bytes[..bytes.len().min(MAGIC_LEN)].to_vec(),
    })?;

    let img = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        Tag2SvgError::DecodeFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    })?;

    debug!(
        "Decoded {} as {:?} {:?} {}x{}",
        path.display(),
        format,
        img.color(),
        img.width(),
        img.height()
    );
    Ok((img, format))
}

/// Decode `bytes` and expand to RGBA8.
///
/// # Errors
/// * [`Tag2SvgError::NotAnImage`] — magic bytes match no enabled format
/// * [`Tag2SvgError::DecodeFailed`] — the decoder rejected the data
/// * [`Tag2SvgError::InvalidInput`] — the image has a zero dimension
pub fn decode_image(path: &Path, bytes: &[u8]) -> Result<RgbaImage, Tag2SvgError> {
    let (img, _) = decode_dynamic(path, bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(Tag2SvgError::invalid_input(format!(
            "'{}' has zero size ({}x{})",
            path.display(),
            img.width(),
            img.height()
        )));
    }
    Ok(img.to_rgba8())
}
