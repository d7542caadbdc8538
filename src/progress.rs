//! Progress-callback trait for per-tag batch events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as [`crate::convert::convert_batch`] works through a tag family.
//! The CLI uses this to drive its progress bar; library callers can forward
//! events to a channel, a log, or nothing at all.
//!
//! # Example
//!
//! ```rust
//! use tag2svg::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_tag_complete(&self, index: usize, total: usize, primitives: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Tag {}/{} done ({} rects)", index + 1, total, primitives);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the batch pipeline as it processes each tag file.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` the
/// per-tag methods may be called from several tasks at once. All methods
/// default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after selection, before any file is decoded.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a file is read.
    ///
    /// # Arguments
    /// * `index`  — 0-based position within the selection
    /// * `total`  — number of selected files
    /// * `source` — the tag image being converted
    fn on_tag_start(&self, index: usize, total: usize, source: &Path) {
        let _ = (index, total, source);
    }

    /// Called right after the SVG for a file lands at `destination`.
    fn on_tag_written(&self, index: usize, total: usize, destination: &Path) {
        let _ = (index, total, destination);
    }

    /// Called once the SVG for a file has been written.
    ///
    /// `primitives` is the number of `<rect>` elements emitted.
    fn on_tag_complete(&self, index: usize, total: usize, primitives: usize) {
        let _ = (index, total, primitives);
    }

    /// Called when a file fails to decode, rasterize or write.
    fn on_tag_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once when the batch ends: after every selected file has been
    /// attempted, or after the first failure stopped it early.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        started_total: AtomicUsize,
        completed_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total: usize) {
            self.started_total.store(total, Ordering::SeqCst);
        }

        fn on_tag_start(&self, _index: usize, _total: usize, _source: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_tag_complete(&self, _index: usize, _total: usize, _primitives: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_tag_error(&self, _index: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total: usize, success_count: usize) {
            self.completed_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(5);
        cb.on_tag_start(0, 5, Path::new("tag36h11/tag36_11_00000.png"));
        cb.on_tag_written(0, 5, Path::new("out/tag36_11_00000_gen.svg"));
        cb.on_tag_complete(0, 5, 100);
        cb.on_tag_error(1, 5, "decode failed");
        cb.on_batch_complete(5, 4);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_batch_start(3);
        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);

        tracker.on_tag_start(0, 3, Path::new("a.png"));
        tracker.on_tag_complete(0, 3, 100);
        tracker.on_tag_start(1, 3, Path::new("b.png"));
        tracker.on_tag_complete(1, 3, 100);
        tracker.on_tag_start(2, 3, Path::new("c.png"));
        tracker.on_tag_error(2, 3, "not an image");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);

        tracker.on_batch_complete(3, 2);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_tag_complete(0, 10, 64);
    }
}
