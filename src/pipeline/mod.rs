//! Pipeline stages for tag-to-SVG conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the rasterizer stays free of I/O.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ rasterize ──▶ write
//! (path)    (image)    (svg text)    (temp + rename)
//! ```
//!
//! 1. [`input`]     — validate a tag path, or select a batch from a family dir
//! 2. [`decode`]    — decode PNG/JPEG bytes and expand to RGBA8
//! 3. [`rasterize`] — emit one unit `<rect>` per pixel; pure and synchronous
//! 4. [`write`]     — persist the document atomically

pub mod decode;
pub mod input;
pub mod rasterize;
pub mod write;

pub use rasterize::{rasterize, rasterize_image};
