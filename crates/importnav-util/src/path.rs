//! Lexical path helpers.
//!
//! Nothing here touches the filesystem: candidates produced during resolution
//! usually do not exist yet, so `canonicalize` is not an option.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// `..` at the root is dropped, matching how the OS treats `/..`.
/// Windows verbatim prefixes are simplified via `dunce`.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in dunce::simplified(path).components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }

    out
}

/// Join `rel` onto `base` and normalize. An absolute `rel` replaces `base`.
#[must_use]
pub fn join_normalized(base: &Path, rel: impl AsRef<Path>) -> PathBuf {
    normalize(&base.join(rel))
}

/// Whether `path` lies at or below `root`, compared component-wise.
#[must_use]
pub fn is_within(path: &Path, root: &Path) -> bool {
    normalize(path).starts_with(normalize(root))
}

/// Final path segment of a specifier-like string (`a/b/c.svg` → `c.svg`).
///
/// Both `/` and `\` count as separators. Returns an empty string when the
/// input ends with a separator.
#[must_use]
pub fn last_segment(spec: &str) -> &str {
    spec.rsplit(['/', '\\']).next().unwrap_or(spec)
}
