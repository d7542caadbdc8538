//! Streaming batch API: emit tag results as they complete.
//!
//! Unlike the eager [`crate::convert::convert_batch`], which returns only
//! after every file has been attempted, [`convert_stream`] yields each
//! [`TagResult`] as soon as its SVG is written. Items arrive in completion
//! order; sort by `index` or `source` if order matters.

use crate::config::ConversionConfig;
use crate::convert::{group_by_destination, process_group};
use crate::error::{Tag2SvgError, TagError};
use crate::output::TagResult;
use crate::pipeline::{input, write};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-tag results.
pub type TagStream = Pin<Box<dyn Stream<Item = Result<TagResult, TagError>> + Send>>;

/// Convert a tag family directory, streaming results as they are ready.
///
/// Selection, output naming, same-name ordering and the stop-on-first-failure
/// rule are the same as [`crate::convert::convert_batch`]. `on_batch_start`
/// fires before the stream is returned; per-tag callbacks fire as items are
/// produced.
/// `on_batch_complete` is not fired, since the caller decides when to stop
/// polling.
///
/// # Returns
/// - `Ok(TagStream)` — a stream of `Result<TagResult, TagError>`
/// - `Err(Tag2SvgError)` — selection failed or `out_dir` cannot be created
///
/// # Example
/// ```rust,no_run
/// use tag2svg::{convert_stream, ConversionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::default();
/// let mut tags = convert_stream("tag36h11", "out", &config).await?;
/// while let Some(tag) = tags.next().await {
///     match tag {
///         Ok(t) => println!("{} → {}", t.source.display(), t.destination.display()),
///         Err(e) => eprintln!("Error: {e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_stream(
    family_dir: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<TagStream, Tag2SvgError> {
    let family_dir = family_dir.as_ref();
    let out_dir = out_dir.as_ref().to_path_buf();
    info!("Starting streaming batch: {}", family_dir.display());

    let selected =
        input::select_tag_files(family_dir, &config.file_prefix, config.tag_ids).await?;
    write::ensure_dir(&out_dir).await?;

    let total = selected.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let concurrency = config.concurrency;
    let config_clone = config.clone();
    let stop = Arc::new(AtomicBool::new(false));
    let groups = group_by_destination(selected, &out_dir, &config.suffix);

    let s = stream::iter(groups.into_iter().map(move |group| {
        let cfg = config_clone.clone();
        let out = out_dir.clone();
        let stop = Arc::clone(&stop);
        async move { process_group(group, total, &out, &cfg, &stop).await }
    }))
    .buffer_unordered(concurrency)
    .flat_map(stream::iter)
    .map(|mut result| match result.error.take() {
        None => Ok(result),
        Some(err) => Err(err),
    });

    Ok(Box::pin(s))
}
