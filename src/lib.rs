//! # tag2svg
//!
//! Convert raster images of fiducial markers (AprilTag PNGs and friends) into
//! SVG documents that reproduce every pixel as a unit square.
//!
//! ## Why vectors?
//!
//! Tag generators ship tiny bitmaps: a `tag36h11` marker is 10 × 10 pixels.
//! Printing one at 20 mm through a bitmap pipeline invites interpolation blur
//! at the cell edges, which costs detection range. An SVG whose viewBox equals
//! the pixel grid and whose declared size is the physical edge length prints
//! perfectly sharp at any size.
//!
//! ## Pipeline Overview
//!
//! ```text
//! tag.png
//!  │
//!  ├─ 1. Input      validate path / select files from a family directory
//!  ├─ 2. Decode     PNG → RGBA8 (CPU-bound, spawn_blocking)
//!  ├─ 3. Rasterize  one <rect> per pixel, exact rgba() fills
//!  └─ 4. Write      temp file + rename, never a partial SVG
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tag2svg::{convert_to_file, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().size("20mm").build()?;
//!     let output = convert_to_file("tag36h11/tag36_11_00007.png", "tag7.svg", &config).await?;
//!     eprintln!("{} rects", output.document.primitive_count());
//!     Ok(())
//! }
//! ```
//!
//! The rasterizer itself is synchronous and I/O-free:
//!
//! ```rust
//! use tag2svg::rasterize;
//!
//! let doc = rasterize(2, 2, |x, y| Some(if x == y { [255; 4] } else { [0, 0, 0, 255] }), "10px")?;
//! assert_eq!(doc.primitive_count(), 4);
//! # Ok::<(), tag2svg::Tag2SvgError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tag2svg` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, IdRange};
pub use convert::{convert, convert_batch, convert_sync, convert_to_file, inspect};
pub use error::{Tag2SvgError, TagError};
pub use output::{
    BatchOutput, BatchStats, ConversionOutput, ImageMetadata, TagResult, VectorDocument,
};
pub use pipeline::{rasterize, rasterize_image};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, TagStream};
