//! Uploaded PDF storage.
//!
//! Uploads land in the work directory under a temporary name made of the
//! original stem plus a random suffix of [`UPLOAD_SUFFIX_LEN`] characters.
//! Before extraction the suffix is stripped and the file renamed, so repeated
//! uploads of the same document overwrite one file instead of piling up.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::types::{AppError, Result};

/// Length of the random segment inserted before the extension.
pub const UPLOAD_SUFFIX_LEN: usize = 8;

const FALLBACK_STEM: &str = "upload";

/// Reduce a client-supplied file name to a safe stem (no directories, no odd characters).
pub fn sanitize_stem(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or("");
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cleaned
    }
}

/// Temporary name for an upload: `<stem><random suffix>.pdf`.
pub fn temp_upload_name(original_name: &str) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(UPLOAD_SUFFIX_LEN)
        .collect();
    format!("{}{}.pdf", sanitize_stem(original_name), suffix)
}

/// Strip the random suffix from a temporary upload path.
///
/// Names whose stem is not longer than the suffix are returned unchanged.
pub fn normalized_upload_path(path: &Path) -> PathBuf {
    let (Some(stem), Some(ext)) = (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|s| s.to_str()),
    ) else {
        return path.to_path_buf();
    };

    let chars = stem.chars().count();
    if chars <= UPLOAD_SUFFIX_LEN {
        return path.to_path_buf();
    }

    let kept: String = stem.chars().take(chars - UPLOAD_SUFFIX_LEN).collect();
    path.with_file_name(format!("{}.{}", kept, ext))
}

/// Write uploaded bytes into `work_dir` under a temporary name.
pub async fn persist_upload(work_dir: &Path, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(work_dir).await?;
    let path = work_dir.join(temp_upload_name(original_name));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Copy a local file into `work_dir` under a temporary name.
pub async fn persist_local_file(work_dir: &Path, source: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(work_dir).await?;
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(FALLBACK_STEM);
    let path = work_dir.join(temp_upload_name(name));
    tokio::fs::copy(source, &path).await.map_err(|e| {
        AppError::Pdf(format!("Failed to read {}: {}", source.display(), e))
    })?;
    Ok(path)
}

/// Rename a temporary upload to its normalized name, replacing any previous file.
pub async fn normalize_upload(path: &Path) -> Result<PathBuf> {
    let target = normalized_upload_path(path);
    if target != path {
        tokio::fs::rename(path, &target).await?;
    }
    Ok(target)
}
