//! Eager conversion entry points.
//!
//! [`convert`] and [`convert_to_file`] handle a single tag image.
//! [`convert_batch`] works through a tag family directory with bounded
//! concurrency and returns once every selected file has been attempted. Use
//! [`crate::stream::convert_stream`] to receive batch results as they finish.

use crate::config::ConversionConfig;
use crate::error::{Tag2SvgError, TagError};
use crate::output::{BatchOutput, BatchStats, ConversionOutput, ImageMetadata, TagResult};
use crate::pipeline::{decode, input, rasterize, write};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one tag image to an SVG document.
///
/// Decoding and rasterization run on the blocking thread pool; the returned
/// document is complete or not returned at all.
///
/// # Errors
/// * [`Tag2SvgError::FileNotFound`] / [`Tag2SvgError::PermissionDenied`]
/// * [`Tag2SvgError::NotAnImage`] / [`Tag2SvgError::DecodeFailed`]
/// * [`Tag2SvgError::InvalidInput`] for zero-sized images
pub async fn convert(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tag2SvgError> {
    let start = Instant::now();
    let source = input::resolve_input(input_path)?;
    debug!("Converting {} at size {}", source.display(), config.size);

    let bytes = input::read_source(&source).await?;
    let size = config.size.clone();
    let path = source.clone();

    let document = tokio::task::spawn_blocking(move || {
        let image = decode::decode_image(&path, &bytes)?;
        rasterize::rasterize_image(&image, &size)
    })
    .await
    .map_err(|e| Tag2SvgError::Internal(format!("Conversion task panicked: {}", e)))??;

    Ok(ConversionOutput {
        source,
        document,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Convert one tag image and write the SVG to `output_path`.
///
/// The write is atomic (temp file + rename). Parent directories are created
/// only when [`ConversionConfig::create_dirs`] is set.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tag2SvgError> {
    let output = convert(input_path, config).await?;
    let path = output_path.as_ref();

    write::write_document(path, output.document.as_str(), config.create_dirs).await?;
    info!(
        "Output SVG file: {} with size: {}",
        path.display(),
        output.document.size()
    );
    Ok(output)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tag2SvgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Tag2SvgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_path, config))
}

/// Decode an image and report its dimensions without converting it.
pub async fn inspect(input_path: impl AsRef<Path>) -> Result<ImageMetadata, Tag2SvgError> {
    let path = input::resolve_input(input_path)?;
    let bytes = input::read_source(&path).await?;
    let decode_path = path.clone();

    let (image, format) =
        tokio::task::spawn_blocking(move || decode::decode_dynamic(&decode_path, &bytes))
            .await
            .map_err(|e| Tag2SvgError::Internal(format!("Inspect task panicked: {}", e)))??;

    Ok(ImageMetadata {
        width: image.width(),
        height: image.height(),
        color_type: format!("{:?}", image.color()),
        format: format!("{:?}", format),
        primitive_count: image.width() as usize * image.height() as usize,
        path,
    })
}

/// Convert every selected tag in `family_dir` into `out_dir`.
///
/// Files are selected by [`ConversionConfig::file_prefix`] and
/// [`ConversionConfig::tag_ids`] (see [`input::select_tag_files`]) and written
/// as `{stem}_{suffix}.svg`. `out_dir` is created if missing. Sources that map
/// to the same output name are converted one after another in sorted order,
/// so the last one wins.
///
/// Unless [`ConversionConfig::keep_going`] is set, the first failed tag stops
/// the batch: tags already in flight finish, no new tag is started.
///
/// # Errors
/// * selection errors ([`Tag2SvgError::FileNotFound`],
///   [`Tag2SvgError::NoTagsSelected`])
/// * [`Tag2SvgError::AllTagsFailed`] when every selected tag failed
/// * [`Tag2SvgError::PartialFailure`] when some tags failed and
///   `keep_going` is off
pub async fn convert_batch(
    family_dir: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchOutput, Tag2SvgError> {
    let total_start = Instant::now();
    let family_dir = family_dir.as_ref();
    let out_dir = out_dir.as_ref();
    info!(
        "Starting batch: {} → {} (ids {})",
        family_dir.display(),
        out_dir.display(),
        config.tag_ids
    );

    let selected =
        input::select_tag_files(family_dir, &config.file_prefix, config.tag_ids).await?;
    write::ensure_dir(out_dir).await?;

    let total = selected.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let stop = AtomicBool::new(false);
    let mut tags: Vec<TagResult> = stream::iter(
        group_by_destination(selected, out_dir, &config.suffix)
            .into_iter()
            .map(|group| process_group(group, total, out_dir, config, &stop)),
    )
    .buffer_unordered(config.concurrency)
    .flat_map(stream::iter)
    .collect()
    .await;

    // Completion order is arbitrary under concurrency
    tags.sort_by(|a, b| a.source.cmp(&b.source));

    let converted = tags.iter().filter(|t| t.error.is_none()).count();
    let failed = tags.len() - converted;
    let skipped = total - tags.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, converted);
    }

    if failed == total {
        let first_error = tags
            .iter()
            .find_map(|t| t.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(Tag2SvgError::AllTagsFailed { total, first_error });
    }
    if skipped > 0 {
        warn!("Batch stopped after a failure: {} tags not attempted", skipped);
    }

    let stats = BatchStats {
        selected_tags: total,
        converted_tags: converted,
        failed_tags: failed,
        skipped_tags: skipped,
        total_primitives: tags
            .iter()
            .filter(|t| t.error.is_none())
            .map(TagResult::primitive_count)
            .sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} tags, {}ms total",
        converted, total, stats.total_duration_ms
    );

    let output = BatchOutput { tags, stats };
    if config.keep_going {
        Ok(output)
    } else {
        output.into_result()
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Indexed sources that share one destination, in selection order.
pub(crate) type TagGroup = Vec<(usize, PathBuf)>;

/// Split the sorted selection into groups keyed by output path. Groups keep
/// the order of their first member; members keep selection order.
pub(crate) fn group_by_destination(
    selected: Vec<PathBuf>,
    out_dir: &Path,
    suffix: &str,
) -> Vec<TagGroup> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut groups: Vec<TagGroup> = Vec::new();

    for (index, source) in selected.into_iter().enumerate() {
        let destination = input::output_path_for(&source, out_dir, suffix);
        match slots.get(&destination) {
            Some(&slot) => {
                debug!(
                    "{} shares output {} with an earlier tag",
                    source.display(),
                    destination.display()
                );
                groups[slot].push((index, source));
            }
            None => {
                slots.insert(destination, groups.len());
                groups.push(vec![(index, source)]);
            }
        }
    }
    groups
}

/// Convert one group sequentially. Without `keep_going`, a failure raises
/// `stop` and every tag not yet started is skipped.
pub(crate) async fn process_group(
    group: TagGroup,
    total: usize,
    out_dir: &Path,
    config: &ConversionConfig,
    stop: &AtomicBool,
) -> Vec<TagResult> {
    let mut results = Vec::with_capacity(group.len());
    for (index, source) in group {
        if stop.load(Ordering::SeqCst) {
            debug!("Skipping {}", source.display());
            break;
        }
        let result = process_tag(index, total, source, out_dir, config).await;
        if result.error.is_some() && !config.keep_going {
            stop.store(true, Ordering::SeqCst);
        }
        results.push(result);
    }
    results
}

/// Convert and write one batch item. Never fails: errors are recorded in the
/// returned [`TagResult`] and reported to the progress callback.
pub(crate) async fn process_tag(
    index: usize,
    total: usize,
    source: PathBuf,
    out_dir: &Path,
    config: &ConversionConfig,
) -> TagResult {
    let start = Instant::now();
    if let Some(ref cb) = config.progress_callback {
        cb.on_tag_start(index, total, &source);
    }

    let destination = input::output_path_for(&source, out_dir, &config.suffix);
    let mut dims = (0, 0);

    let outcome = match convert(&source, config).await {
        Ok(output) => {
            dims = (output.document.width(), output.document.height());
            write::write_document(&destination, output.document.as_str(), false)
                .await
                .map(|_| output.document.primitive_count())
        }
        Err(e) => Err(e),
    };

    let error = match outcome {
        Ok(primitives) => {
            info!(
                "Output SVG file: {} with size: {}",
                destination.display(),
                config.size
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_tag_written(index, total, &destination);
                cb.on_tag_complete(index, total, primitives);
            }
            None
        }
        Err(e) => {
            warn!("Failed to convert {}: {}", source.display(), e);
            let err = TagError::from_fatal(source.clone(), &e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_tag_error(index, total, &err.to_string());
            }
            Some(err)
        }
    };

    TagResult {
        index,
        source,
        destination,
        width: dims.0,
        height: dims.1,
        duration_ms: start.elapsed().as_millis() as u64,
        error,
    }
}
