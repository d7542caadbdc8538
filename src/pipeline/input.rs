//! Input resolution: validate a single tag image path, or select a batch of
//! tag images from a family directory.
//!
//! Batch selection mirrors how tag families are shipped: one directory per
//! family (`tag36h11/`, `tagStandard52h13/`, …) holding zero-padded files
//! such as `tag36_11_00007.png`. Sorting the names lexicographically puts
//! them in ID order, so an index range over the sorted list is an ID range.

use crate::config::IdRange;
use crate::error::Tag2SvgError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Validate that `path` names a readable regular file.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<PathBuf, Tag2SvgError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(Tag2SvgError::FileNotFound { path });
    }

    // Check read permission by attempting to open
    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Tag2SvgError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Tag2SvgError::FileNotFound { path });
        }
    }

    debug!("Resolved tag file: {}", path.display());
    Ok(path)
}

/// Read the raw bytes of a resolved input.
pub async fn read_source(path: &Path) -> Result<Vec<u8>, Tag2SvgError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Tag2SvgError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Tag2SvgError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Tag2SvgError::DecodeFailed {
            path: path.to_path_buf(),
            detail: format!("read failed: {e}"),
        },
    })
}

/// List `dir`, keep regular files whose name starts with `prefix`, sort them
/// and return the `range` slice.
///
/// # Errors
/// * [`Tag2SvgError::FileNotFound`] when `dir` is missing or not a directory
/// * [`Tag2SvgError::NoTagsSelected`] when the range selects nothing
pub async fn select_tag_files(
    dir: &Path,
    prefix: &str,
    range: IdRange,
) -> Result<Vec<PathBuf>, Tag2SvgError> {
    if !dir.is_dir() {
        return Err(Tag2SvgError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let list_err = |e: std::io::Error| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Tag2SvgError::PermissionDenied {
            path: dir.to_path_buf(),
        },
        _ => Tag2SvgError::Internal(format!("Failed to list '{}': {}", dir.display(), e)),
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(list_err)?;
    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        let matches_prefix = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix));
        if !matches_prefix {
            continue;
        }
        let path = entry.path();
        // Follows symlinks, unlike DirEntry::file_type.
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            candidates.push(path);
        }
    }

    candidates.sort();
    let found = candidates.len();
    let selected = range.slice(&candidates).to_vec();

    if selected.is_empty() {
        return Err(Tag2SvgError::NoTagsSelected {
            dir: dir.to_path_buf(),
            range: range.to_string(),
        });
    }

    info!(
        "Selected {} of {} '{}*' files in {} (range {})",
        selected.len(),
        found,
        prefix,
        dir.display(),
        range
    );
    Ok(selected)
}

/// Output path for a batch item: `{out_dir}/{stem}_{suffix}.svg`, where the
/// stem is the file name up to its first `.`.
pub fn output_path_for(tag_file: &Path, out_dir: &Path, suffix: &str) -> PathBuf {
    let name = tag_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    out_dir.join(format!("{stem}_{suffix}.svg"))
}
