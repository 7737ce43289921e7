//! Existence probing for candidate base paths.
//!
//! Phase 1 tries a fixed suffix list concurrently and picks the
//! highest-priority hit, regardless of which check finished first.
//! Phase 2 scans the parent directory for any file sharing the base name,
//! which covers extensions nobody enumerated (images, fonts, ...).
//! Filesystem errors in either phase read as "not found".

use importnav_util::path::last_segment;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Probe `base` for a real file.
pub async fn probe(base: &Path, suffixes: &[String]) -> Option<PathBuf> {
    if let Some(hit) = probe_suffixes(base, suffixes).await {
        return Some(hit);
    }
    scan_siblings(base).await
}

/// Phase 1: `base + suffix` for every suffix, highest priority hit wins.
pub async fn probe_suffixes(base: &Path, suffixes: &[String]) -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = suffixes.iter().map(|s| with_suffix(base, s)).collect();

    let checks = candidates.iter().map(|path| is_file(path));
    let found = futures::future::join_all(checks).await;

    // join_all keeps input order, so the first hit is the highest priority one.
    candidates
        .into_iter()
        .zip(found)
        .find_map(|(path, exists)| exists.then_some(path))
        .inspect(|path| trace!(path = %path.display(), "suffix probe hit"))
}

/// Phase 2: first file (by name) in `base`'s directory whose name starts with
/// `base`'s final segment. Subdirectories are ignored.
pub async fn scan_siblings(base: &Path) -> Option<PathBuf> {
    let stem = base_name(base)?;
    let dir = base.parent()?.to_path_buf();

    let files = tokio::task::spawn_blocking(move || importnav_util::fs::sorted_files_in(&dir))
        .await
        .ok()?
        .ok()?;

    files
        .into_iter()
        .find(|file| {
            file.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with(stem.as_str()))
        })
        .inspect(|path| trace!(path = %path.display(), "directory scan hit"))
}

fn base_name(base: &Path) -> Option<String> {
    // `Path::file_name` skips a trailing `/` and `..`; the raw text does not.
    let text = base.to_str()?;
    let name = last_segment(text);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}
