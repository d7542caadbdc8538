//! Atomic persistence of generated documents.
//!
//! The document is written to a uniquely named temp file next to the target
//! and persisted (renamed) into place, so a reader never observes a
//! half-written SVG and a failed conversion leaves nothing behind. Two writers
//! racing for the same target never share a temp file; the last rename wins.

use crate::error::Tag2SvgError;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Prefix of in-flight temp files in the output directory.
pub(crate) const TEMP_PREFIX: &str = ".tag2svg-";

/// Write `text` to `path` via temp file + rename.
///
/// When `create_dirs` is set, missing parent directories are created first;
/// otherwise a missing parent is an [`Tag2SvgError::OutputWriteFailed`].
pub async fn write_document(path: &Path, text: &str, create_dirs: bool) -> Result<(), Tag2SvgError> {
    let fail = |source: io::Error| Tag2SvgError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if create_dirs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(fail)?;
        }
    }

    let target = path.to_path_buf();
    let bytes = text.as_bytes().to_vec();
    tokio::task::spawn_blocking(move || persist(&target, &bytes))
        .await
        .map_err(|e| Tag2SvgError::Internal(format!("Write task panicked: {}", e)))?
        .map_err(fail)?;

    debug!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

/// Create `dir` and its parents.
pub async fn ensure_dir(dir: &Path) -> Result<(), Tag2SvgError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Tag2SvgError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source,
        })
}

fn persist(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    // A failed persist hands the temp file back; dropping it deletes it.
    tmp.persist(path).map(drop).map_err(|e| e.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(TEMP_PREFIX))
            .collect()
    }

    #[tokio::test]
    async fn writes_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("tag_gen.svg");
        write_document(&out, "<svg/>\n", false).await.unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "<svg/>\n");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a.svg");
        std::fs::write(&out, "old").unwrap();
        write_document(&out, "new", false).await.unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "new");
    }

    #[tokio::test]
    async fn missing_parent_fails_without_create_dirs() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/deeper/a.svg");
        let err = write_document(&out, "<svg/>", false).await.unwrap_err();

        assert!(matches!(err, Tag2SvgError::OutputWriteFailed { .. }));
        assert!(!out.exists());
        assert!(!dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("tag_gen.svg");
        std::fs::create_dir(&out).unwrap();

        let err = write_document(&out, "<svg/>", false).await.unwrap_err();

        assert!(matches!(err, Tag2SvgError::OutputWriteFailed { .. }), "{err:?}");
        assert!(out.is_dir());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn concurrent_writers_to_one_target_both_succeed() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("tag_gen.svg");
        let a = "a".repeat(64 * 1024);
        let b = "b".repeat(64 * 1024);

        let (ra, rb) = tokio::join!(
            write_document(&out, &a, false),
            write_document(&out, &b, false)
        );
        ra.unwrap();
        rb.unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text == a || text == b);
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn create_dirs_makes_parents() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/deeper/a.svg");
        write_document(&out, "<svg/>", true).await.unwrap();
        assert!(out.is_file());
    }
}
