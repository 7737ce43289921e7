//! Alias matching: specifier → ordered candidate base paths.
//!
//! Bundler aliases come first, then path-mapping entries. Within each source
//! longer keys win, so `@app/ui` is tried before `@app`.

use super::loader::ConfigSnapshot;
use importnav_util::path::{join_normalized, normalize};
use regex_lite::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::trace;

/// Produce the candidate base paths for a non-relative specifier.
///
/// Candidates are absolute, normalized, and unique in first-seen order.
/// An empty result means nothing matched.
#[must_use]
pub fn match_aliases(spec: &str, snapshot: &ConfigSnapshot) -> Vec<PathBuf> {
    let mut candidates = bundler_candidates(spec, snapshot);
    candidates.extend(path_mapping_candidates(spec, snapshot));

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|c| normalize(&c))
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

fn bundler_candidates(spec: &str, snapshot: &ConfigSnapshot) -> Vec<PathBuf> {
    snapshot
        .aliases()
        .iter()
        .filter_map(|(key, target)| {
            let rest = alias_remainder(spec, key)?;
            trace!(alias = %key, rest, "bundler alias matched");
            Some(if rest.is_empty() {
                target.clone()
            } else {
                target.join(rest)
            })
        })
        .collect()
}

/// Descending key length, ties broken by key text so ordering is stable.
pub(crate) fn longest_first(a: &str, b: &str) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| a.cmp(b))
}

/// `Some(rest)` if `spec` is `key` or `key/rest`.
fn alias_remainder<'a>(spec: &'a str, key: &str) -> Option<&'a str> {
    let tail = spec.strip_prefix(key)?;
    if tail.is_empty() {
        Some("")
    } else {
        tail.strip_prefix('/')
    }
}

fn path_mapping_candidates(spec: &str, snapshot: &ConfigSnapshot) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for mapping in snapshot.mappings() {
        let Some(capture) = mapping.pattern.capture(spec) else {
            continue;
        };
        trace!(pattern = %mapping.key, capture = %capture, "path mapping matched");
        for target in &mapping.targets {
            let substituted = target.replacen('*', &capture, 1);
            out.push(join_normalized(&snapshot.paths_base, substituted));
        }
    }
    out
}

/// A path-mapping entry with its key compiled.
#[derive(Debug, Clone)]
pub struct CompiledMapping {
    key: String,
    pattern: PathPattern,
    targets: Vec<String>,
}

impl CompiledMapping {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for CompiledMapping {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.targets == other.targets
    }
}

impl Eq for CompiledMapping {}

/// Compile a path-mapping table, longest key first. Keys that can never
/// match are dropped.
#[must_use]
pub fn compile_mappings(paths: &[(String, Vec<String>)]) -> Vec<CompiledMapping> {
    let mut compiled: Vec<CompiledMapping> = paths
        .iter()
        .filter_map(|(key, targets)| {
            Some(CompiledMapping {
                pattern: PathPattern::compile(key)?,
                key: key.clone(),
                targets: targets.clone(),
            })
        })
        .collect();
    compiled.sort_by(|a, b| longest_first(&a.key, &b.key));
    compiled
}

/// A compiled path-mapping key.
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// No `*`: matches only itself.
    Exact(String),
    /// Exactly one `*`, compiled to `^prefix(.*)suffix$`.
    Wildcard(Regex),
}

impl PathPattern {
    /// Compile a key. Keys with more than one `*` are rejected.
    #[must_use]
    pub fn compile(key: &str) -> Option<Self> {
        match key.matches('*').count() {
            0 => Some(Self::Exact(key.to_string())),
            1 => {
                let (prefix, suffix) = key.split_once('*')?;
                let pattern = format!(
                    "^{}(.*){}$",
                    regex_lite::escape(prefix),
                    regex_lite::escape(suffix)
                );
                Regex::new(&pattern).ok().map(Self::Wildcard)
            }
            _ => None,
        }
    }

    /// The text the `*` stood for, or an empty capture for an exact match.
    #[must_use]
    pub fn capture(&self, spec: &str) -> Option<String> {
        match self {
            Self::Exact(key) => (key == spec).then(String::new),
            Self::Wildcard(re) => re
                .captures(spec)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot::empty(PathBuf::from("/proj"))
    }

    #[test]
    fn test_wildcard_mapping_against_base_url() {
        let mut snap = snapshot();
        snap.base_url = Some(PathBuf::from("/proj"));
        snap.paths_base = PathBuf::from("/proj");
        snap.set_paths(vec![("@/*".to_string(), vec!["src/*".to_string()])]);

        assert_eq!(
            match_aliases("@/assets/logo.svg", &snap),
            vec![PathBuf::from("/proj/src/assets/logo.svg")]
        );
    }

    #[test]
    fn test_mapping_without_base_url_uses_paths_base() {
        let mut snap = snapshot();
        snap.set_paths(vec![("~lib".to_string(), vec!["lib/index".to_string()])]);

        assert_eq!(
            match_aliases("~lib", &snap),
            vec![PathBuf::from("/proj/lib/index")]
        );
        assert!(match_aliases("~lib/x", &snap).is_empty());
    }

    #[test]
    fn test_multiple_replacements_keep_order() {
        let mut snap = snapshot();
        snap.set_paths(vec![(
            "#/*".to_string(),
            vec!["generated/*".to_string(), "src/*".to_string()],
        )]);

        assert_eq!(
            match_aliases("#/api", &snap),
            vec![
                PathBuf::from("/proj/generated/api"),
                PathBuf::from("/proj/src/api")
            ]
        );
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let mut snap = snapshot();
        snap.set_paths(vec![("$lib.(x)/*".to_string(), vec!["lib/*".to_string()])]);

        assert_eq!(
            match_aliases("$lib.(x)/a", &snap),
            vec![PathBuf::from("/proj/lib/a")]
        );
        assert!(match_aliases("$libX(x)/a", &snap).is_empty());
    }

    #[test]
    fn test_wildcard_with_suffix() {
        let mut snap = snapshot();
        snap.set_paths(vec![("icons/*.svg".to_string(), vec!["assets/icons/*.svg".to_string()])]);

        assert_eq!(
            match_aliases("icons/home.svg", &snap),
            vec![PathBuf::from("/proj/assets/icons/home.svg")]
        );
        assert!(match_aliases("icons/home.png", &snap).is_empty());
    }

    #[test]
    fn test_longest_bundler_alias_first() {
        let mut snap = snapshot();
        snap.set_aliases(vec![
            ("@".to_string(), PathBuf::from("/proj/A")),
            ("@/ui".to_string(), PathBuf::from("/proj/B")),
        ]);

        assert_eq!(
            match_aliases("@/ui/button", &snap),
            vec![PathBuf::from("/proj/B/button"), PathBuf::from("/proj/A/ui/button")]
        );
    }

    #[test]
    fn test_alias_requires_segment_boundary() {
        let mut snap = snapshot();
        snap.set_aliases(vec![("@app".to_string(), PathBuf::from("/proj/app"))]);

        assert_eq!(match_aliases("@app", &snap), vec![PathBuf::from("/proj/app")]);
        assert!(match_aliases("@application/x", &snap).is_empty());
    }

    #[test]
    fn test_bundler_before_path_mapping_and_dedup() {
        let mut snap = snapshot();
        snap.set_aliases(vec![("@".to_string(), PathBuf::from("/proj/src"))]);
        snap.set_paths(vec![(
            "@/*".to_string(),
            vec!["src/*".to_string(), "lib/*".to_string()],
        )]);

        assert_eq!(
            match_aliases("@/util", &snap),
            vec![PathBuf::from("/proj/src/util"), PathBuf::from("/proj/lib/util")]
        );
    }

    #[test]
    fn test_absolute_mapping_target() {
        let mut snap = snapshot();
        snap.set_paths(vec![("shared/*".to_string(), vec!["/opt/shared/*".to_string()])]);

        assert_eq!(
            match_aliases("shared/x", &snap),
            vec![PathBuf::from("/opt/shared/x")]
        );
    }

    #[test]
    fn test_candidates_are_normalized() {
        let mut snap = snapshot();
        snap.set_paths(vec![("up/*".to_string(), vec!["../sibling/*".to_string()])]);

        assert_eq!(
            match_aliases("up/./x", &snap),
            vec![PathBuf::from("/sibling/x")]
        );
    }

    #[test]
    fn test_pattern_with_two_wildcards_never_matches() {
        assert!(PathPattern::compile("a/*/b/*").is_none());
    }

    #[test]
    fn test_mappings_compiled_once_longest_first() {
        let mut snap = snapshot();
        snap.set_paths(vec![
            ("@/*".to_string(), vec!["src/*".to_string()]),
            ("a/*/b/*".to_string(), vec!["x/*".to_string()]),
            ("@/ui/*".to_string(), vec!["ui/*".to_string()]),
        ]);

        let keys: Vec<_> = snap.mappings().iter().map(CompiledMapping::key).collect();
        assert_eq!(keys, vec!["@/ui/*", "@/*"]);
        // The raw table keeps file order for display.
        assert_eq!(snap.paths()[0].0, "@/*");
        assert_eq!(
            match_aliases("@/ui/x", &snap),
            vec![PathBuf::from("/proj/ui/x"), PathBuf::from("/proj/src/ui/x")]
        );
    }

    #[test]
    fn test_no_match_is_empty() {
        let snap = snapshot();
        assert!(match_aliases("lodash", &snap).is_empty());
    }
}
