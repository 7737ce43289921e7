//! Workspace-wide file search, used as the last resort before declaring a
//! specifier external.

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File enumeration capability.
///
/// `include` and `exclude` are glob patterns matched against paths relative
/// to `root`. At most `limit` results are returned.
pub trait WorkspaceSearch: Send + Sync + std::fmt::Debug {
    /// Find files under `root`. Blocking.
    fn find_files(
        &self,
        root: &Path,
        include: &str,
        exclude: Option<&str>,
        limit: usize,
    ) -> Vec<PathBuf>;
}

/// Include glob for files whose name starts with `segment`, at any depth.
#[must_use]
pub fn name_prefix_glob(segment: &str) -> String {
    format!("**/{}*", Pattern::escape(segment))
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// [`WorkspaceSearch`] backed by a sorted `walkdir` traversal.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkdirSearch;

impl WorkspaceSearch for WalkdirSearch {
    fn find_files(
        &self,
        root: &Path,
        include: &str,
        exclude: Option<&str>,
        limit: usize,
    ) -> Vec<PathBuf> {
        if limit == 0 {
            return Vec::new();
        }

        let include = match Pattern::new(include) {
            Ok(p) => p,
            Err(err) => {
                debug!(pattern = include, error = %err, "invalid include glob");
                return Vec::new();
            }
        };
        let exclude = match exclude.map(Pattern::new).transpose() {
            Ok(p) => p,
            Err(err) => {
                debug!(error = %err, "invalid exclude glob");
                return Vec::new();
            }
        };

        let relative = |path: &Path| path.strip_prefix(root).map(Path::to_path_buf).ok();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let (Some(ex), Some(rel)) = (exclude.as_ref(), relative(entry.path())) else {
                    return true;
                };
                // A directory is pruned when anything inside it would be excluded.
                !ex.matches_path_with(&rel.join("_"), MATCH_OPTIONS)
            });

        let mut found = Vec::new();
        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = relative(entry.path()) else {
                continue;
            };
            if exclude
                .as_ref()
                .is_some_and(|ex| ex.matches_path_with(&rel, MATCH_OPTIONS))
            {
                continue;
            }
            if include.matches_path_with(&rel, MATCH_OPTIONS) {
                found.push(entry.into_path());
                if found.len() >= limit {
                    break;
                }
            }
        }

        found
    }
}
