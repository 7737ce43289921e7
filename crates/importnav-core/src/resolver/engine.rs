//! Resolution orchestrator.
//!
//! Phases, first success wins:
//! 1. normalize the specifier
//! 2. relative: probe against the requesting file's directory, stop there
//! 3. alias: probe every candidate from bundler aliases and path mapping
//! 4. workspace search for a file named like the final segment
//! 5. external package: unresolved

use super::cache::{ConfigCache, TtlConfigCache};
use super::loader::{ConfigLoader, ConfigSnapshot};
use super::matcher::match_aliases;
use super::probe::probe;
use super::search::{name_prefix_glob, WalkdirSearch, WorkspaceSearch};
use super::specifier::{self, SpecifierKind};
use super::trace::{steps, ResolveTrace, ResolveTraceStep};
use crate::config::ResolverConfig;
use importnav_util::path::{join_normalized, last_segment, normalize};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Phase that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvePhase {
    Relative,
    Alias,
    WorkspaceSearch,
}

impl std::fmt::Display for ResolvePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Relative => "relative",
            Self::Alias => "alias",
            Self::WorkspaceSearch => "workspace_search",
        };
        f.write_str(s)
    }
}

/// Reason codes for unresolved specifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolveReasonCode {
    EmptySpecifier,
    /// Relative specifier without a requesting file to anchor it.
    NoRequestingFile,
    /// Relative specifier that points at nothing.
    BrokenRelative,
    /// No alias, no workspace match: assumed to be an npm package.
    ExternalPackage,
}

impl std::fmt::Display for ResolveReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EmptySpecifier => "EMPTY_SPECIFIER",
            Self::NoRequestingFile => "NO_REQUESTING_FILE",
            Self::BrokenRelative => "BROKEN_RELATIVE",
            Self::ExternalPackage => "EXTERNAL_PACKAGE",
        };
        write!(f, "{s}")
    }
}

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolveOutcome {
    Found { path: PathBuf, phase: ResolvePhase },
    Unresolved { reason: ResolveReasonCode },
}

impl ResolveOutcome {
    /// The resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found { path, .. } => Some(path),
            Self::Unresolved { .. } => None,
        }
    }

    #[must_use]
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Found { path, .. } => Some(path),
            Self::Unresolved { .. } => None,
        }
    }
}

/// Everything the explain command shows for one specifier.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// Specifier after quote stripping.
    pub specifier: String,
    pub kind: SpecifierKind,
    /// Alias candidates in probe order (empty for relative specifiers).
    pub candidates: Vec<PathBuf>,
    pub outcome: ResolveOutcome,
    pub trace: ResolveTrace,
}

/// Module specifier resolver.
///
/// Cheap to clone; clones share the config cache.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: Arc<ResolverConfig>,
    loader: ConfigLoader,
    search: Arc<dyn WorkspaceSearch>,
}

impl Resolver {
    /// Create a resolver with a TTL cache and a `walkdir` workspace search.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        let cache = Arc::new(TtlConfigCache::new(config.cache_ttl));
        Self::with_cache(config, cache)
    }

    /// Create a resolver with an injected config cache.
    #[must_use]
    pub fn with_cache(config: ResolverConfig, cache: Arc<dyn ConfigCache>) -> Self {
        let loader = ConfigLoader::new(&config.project_root, cache);
        Self {
            config: Arc::new(config),
            loader,
            search: Arc::new(WalkdirSearch),
        }
    }

    /// Replace the workspace search capability.
    #[must_use]
    pub fn with_search(mut self, search: Arc<dyn WorkspaceSearch>) -> Self {
        self.search = search;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Config snapshot in effect for a requesting file.
    pub async fn snapshot(&self, requesting_file: Option<&Path>) -> Arc<ConfigSnapshot> {
        let loader = self.loader.clone();
        let file = requesting_file.map(Path::to_path_buf);
        let root = self.config.project_root.clone();

        tokio::task::spawn_blocking(move || loader.load(file.as_deref()))
            .await
            .unwrap_or_else(|err| {
                debug!(error = %err, "config load task failed");
                Arc::new(ConfigSnapshot::empty(root))
            })
    }

    /// Resolve `spec` as written in `requesting_file`. Never fails: anything
    /// that goes wrong along the way reads as "not found".
    pub async fn resolve_import(
        &self,
        spec: &str,
        requesting_file: Option<&Path>,
    ) -> Option<PathBuf> {
        self.explain(spec, requesting_file).await.outcome.into_path()
    }

    /// Like [`Resolver::resolve_import`], with `file://` URIs on both ends.
    ///
    /// A requesting URI that is not a `file://` URI is treated as absent.
    pub async fn resolve_import_uri(&self, spec: &str, requesting_uri: Option<&str>) -> Option<Url> {
        let requesting_file = requesting_uri.and_then(|uri| {
            Url::parse(uri)
                .ok()
                .filter(|u| u.scheme() == "file")
                .and_then(|u| u.to_file_path().ok())
        });

        let resolved = self.resolve_import(spec, requesting_file.as_deref()).await?;
        Url::from_file_path(resolved).ok()
    }

    /// Resolve and report every step taken.
    pub async fn explain(&self, raw_spec: &str, requesting_file: Option<&Path>) -> Explanation {
        let mut trace = ResolveTrace::new();
        let spec = specifier::normalize(raw_spec).to_string();
        trace.success(steps::NORMALIZE, format!("{raw_spec} -> {spec}"));

        let requesting_file = requesting_file.map(|f| self.absolute(f));
        let (kind, candidates, outcome) =
            self.run(&spec, requesting_file.as_deref(), &mut trace).await;

        if self.config.debug {
            for step in &trace.steps {
                debug!(
                    spec = %spec,
                    step = step.step,
                    ok = step.ok,
                    path = ?step.path,
                    "{}",
                    step.detail
                );
            }
        }

        Explanation {
            specifier: spec,
            kind,
            candidates,
            outcome,
            trace,
        }
    }

    async fn run(
        &self,
        spec: &str,
        requesting_file: Option<&Path>,
        trace: &mut ResolveTrace,
    ) -> (SpecifierKind, Vec<PathBuf>, ResolveOutcome) {
        if spec.is_empty() {
            trace.failure(steps::CLASSIFY, "empty specifier");
            return (
                SpecifierKind::Bare,
                Vec::new(),
                unresolved(ResolveReasonCode::EmptySpecifier),
            );
        }

        if specifier::is_relative(spec) {
            trace.success(steps::CLASSIFY, SpecifierKind::Relative.as_str());
            let outcome = self.resolve_relative(spec, requesting_file, trace).await;
            return (SpecifierKind::Relative, Vec::new(), outcome);
        }

        let snapshot = self.snapshot(requesting_file).await;
        trace.add_step(describe_snapshot(&snapshot));

        let candidates = match_aliases(spec, &snapshot);
        let kind = if candidates.is_empty() {
            SpecifierKind::Bare
        } else {
            SpecifierKind::Aliased
        };
        trace.success(steps::CLASSIFY, kind.as_str());

        if candidates.is_empty() {
            trace.failure(steps::MATCH_ALIAS, "no alias or path mapping matched");
        } else {
            trace.success(
                steps::MATCH_ALIAS,
                format!("{} candidate(s)", candidates.len()),
            );
        }

        for candidate in &candidates {
            match probe(candidate, &self.config.suffixes).await {
                Some(path) => {
                    trace.add_step(
                        ResolveTraceStep::new(steps::PROBE, true, "file found").with_path(&path),
                    );
                    return (kind, candidates, resolved(path, ResolvePhase::Alias));
                }
                None => trace.add_step(
                    ResolveTraceStep::new(steps::PROBE, false, "no file").with_path(candidate),
                ),
            }
        }

        if let Some(path) = self.search_workspace(spec, trace).await {
            return (kind, candidates, resolved(path, ResolvePhase::WorkspaceSearch));
        }

        trace.failure(steps::EXTERNAL, "treated as an external package");
        (kind, candidates, unresolved(ResolveReasonCode::ExternalPackage))
    }

    async fn resolve_relative(
        &self,
        spec: &str,
        requesting_file: Option<&Path>,
        trace: &mut ResolveTrace,
    ) -> ResolveOutcome {
        let Some(file) = requesting_file else {
            trace.failure(steps::RESOLVE_RELATIVE, "no requesting file");
            return unresolved(ResolveReasonCode::NoRequestingFile);
        };

        let dir = file.parent().unwrap_or(Path::new("/"));
        let base = join_normalized(dir, spec);
        trace.add_step(
            ResolveTraceStep::new(steps::RESOLVE_RELATIVE, true, "joined onto requesting directory")
                .with_path(&base),
        );

        if let Some(path) = probe(&base, &self.config.suffixes).await {
            trace.add_step(ResolveTraceStep::new(steps::PROBE, true, "file found").with_path(&path));
            return resolved(path, ResolvePhase::Relative);
        }

        trace.add_step(ResolveTraceStep::new(steps::PROBE, false, "no file").with_path(&base));
        unresolved(ResolveReasonCode::BrokenRelative)
    }

    async fn search_workspace(&self, spec: &str, trace: &mut ResolveTrace) -> Option<PathBuf> {
        let segment = last_segment(spec);
        if segment.is_empty() {
            trace.failure(steps::WORKSPACE_SEARCH, "no final path segment");
            return None;
        }

        let include = name_prefix_glob(segment);
        let exclude = self.config.search_exclude.clone();
        let limit = self.config.search_limit;
        let root = self.config.project_root.clone();
        let search = Arc::clone(&self.search);

        let exclude_glob = (!exclude.is_empty()).then_some(exclude);
        let hits = tokio::task::spawn_blocking({
            let include = include.clone();
            move || search.find_files(&root, &include, exclude_glob.as_deref(), limit)
        })
        .await
        .unwrap_or_else(|err| {
            debug!(error = %err, "workspace search task failed");
            Vec::new()
        });

        if let Some(first) = hits.into_iter().next() {
            trace.add_step(
                ResolveTraceStep::new(steps::WORKSPACE_SEARCH, true, include).with_path(&first),
            );
            Some(first)
        } else {
            trace.failure(steps::WORKSPACE_SEARCH, format!("{include}: no match"));
            None
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            join_normalized(&self.config.project_root, path)
        }
    }
}

fn resolved(path: PathBuf, phase: ResolvePhase) -> ResolveOutcome {
    ResolveOutcome::Found { path, phase }
}

fn unresolved(reason: ResolveReasonCode) -> ResolveOutcome {
    ResolveOutcome::Unresolved { reason }
}

fn describe_snapshot(snapshot: &ConfigSnapshot) -> ResolveTraceStep {
    let detail = format!(
        "{} path mapping(s), {} bundler alias(es)",
        snapshot.paths().len(),
        snapshot.aliases().len()
    );
    let step = ResolveTraceStep::new(steps::LOAD_CONFIG, true, detail);
    match &snapshot.path_mapping_file {
        Some(file) => step.with_path(file),
        None => step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::cache::NoConfigCache;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    fn project() -> (TempDir, Resolver) {
        let dir = tempdir().unwrap();
        let resolver = Resolver::new(ResolverConfig::new(dir.path().to_path_buf()));
        (dir, resolver)
    }

    /// Records every search so tests can assert it was (not) consulted.
    #[derive(Debug, Default)]
    struct CountingSearch {
        calls: AtomicUsize,
    }

    impl WorkspaceSearch for CountingSearch {
        fn find_files(&self, root: &Path, include: &str, exclude: Option<&str>, limit: usize) -> Vec<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            WalkdirSearch.find_files(root, include, exclude, limit)
        }
    }

    #[tokio::test]
    async fn test_relative_sibling() {
        let (dir, resolver) = project();
        let app = touch(dir.path(), "src/app.ts");
        let util = touch(dir.path(), "src/util.ts");

        assert_eq!(resolver.resolve_import("./util", Some(&app)).await, Some(util));
    }

    #[tokio::test]
    async fn test_quoted_relative_parent() {
        let (dir, resolver) = project();
        let app = touch(dir.path(), "src/pages/home.tsx");
        let theme = touch(dir.path(), "src/theme.css");

        assert_eq!(
            resolver.resolve_import("'../theme.css'", Some(&app)).await,
            Some(theme)
        );
    }

    #[tokio::test]
    async fn test_broken_relative_never_falls_through() {
        let dir = tempdir().unwrap();
        let search = Arc::new(CountingSearch::default());
        let resolver = Resolver::new(ResolverConfig::new(dir.path().to_path_buf()))
            .with_search(search.clone());
        let app = touch(dir.path(), "src/app.ts");
        // A same-named file elsewhere must not be picked up.
        touch(dir.path(), "lib/missing.ts");

        let explanation = resolver.explain("./missing", Some(&app)).await;
        assert_eq!(
            explanation.outcome,
            ResolveOutcome::Unresolved {
                reason: ResolveReasonCode::BrokenRelative
            }
        );
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_relative_without_requesting_file() {
        let (_dir, resolver) = project();
        let explanation = resolver.explain("./util", None).await;
        assert_eq!(
            explanation.outcome,
            ResolveOutcome::Unresolved {
                reason: ResolveReasonCode::NoRequestingFile
            }
        );
    }

    #[tokio::test]
    async fn test_path_mapping_wildcard() {
        let (dir, resolver) = project();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{"compilerOptions": {"baseUrl": ".", "paths": {"@/*": ["src/*"]}}}"#,
        )
        .unwrap();
        let app = touch(dir.path(), "src/main.ts");
        let logo = touch(dir.path(), "src/assets/logo.svg");

        let explanation = resolver.explain("@/assets/logo.svg", Some(&app)).await;
        assert_eq!(explanation.kind, SpecifierKind::Aliased);
        assert_eq!(
            explanation.outcome,
            ResolveOutcome::Found {
                path: logo,
                phase: ResolvePhase::Alias
            }
        );
    }

    #[tokio::test]
    async fn test_bundler_alias_longest_key_wins() {
        let (dir, resolver) = project();
        fs::write(
            dir.path().join("vite.config.ts"),
            r#"export default { resolve: { alias: { '@': './A', '@/ui': './B' } } };"#,
        )
        .unwrap();
        let a = touch(dir.path(), "A/ui/button.ts");
        let b = touch(dir.path(), "B/button.ts");

        let explanation = resolver.explain("@/ui/button", None).await;
        assert_eq!(
            explanation.candidates,
            vec![dir.path().join("B/button"), dir.path().join("A/ui/button")]
        );
        assert_eq!(explanation.outcome.path(), Some(b.as_path()));
        assert_ne!(explanation.outcome.path(), Some(a.as_path()));
    }

    #[tokio::test]
    async fn test_malformed_bundler_config_does_not_block_path_mapping() {
        let (dir, resolver) = project();
        fs::write(
            dir.path().join("vite.config.js"),
            "export default { resolve: { alias: { '@': makeAlias( } } };",
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{"compilerOptions": {"paths": {"@/*": ["src/*"]}}}"#,
        )
        .unwrap();
        let util = touch(dir.path(), "src/util.ts");

        assert_eq!(resolver.resolve_import("@/util", None).await, Some(util));
    }

    #[tokio::test]
    async fn test_nested_project_config_wins() {
        let (dir, resolver) = project();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{"compilerOptions": {"baseUrl": ".", "paths": {"~/*": ["root-src/*"]}}}"#,
        )
        .unwrap();
        let app = dir.path().join("packages/app");
        fs::create_dir_all(&app).unwrap();
        fs::write(
            app.join("tsconfig.json"),
            r#"{"compilerOptions": {"baseUrl": ".", "paths": {"~/*": ["src/*"]}}}"#,
        )
        .unwrap();
        touch(dir.path(), "root-src/config.ts");
        let nested = touch(&app, "src/config.ts");
        let main = touch(&app, "src/main.ts");

        assert_eq!(
            resolver.resolve_import("~/config", Some(&main)).await,
            Some(nested)
        );
    }

    #[tokio::test]
    async fn test_bare_specifier_is_external() {
        let (dir, resolver) = project();
        touch(dir.path(), "src/app.ts");
        touch(dir.path(), "node_modules/lodash/lodash.js");

        let explanation = resolver.explain("lodash", None).await;
        assert_eq!(explanation.kind, SpecifierKind::Bare);
        assert_eq!(
            explanation.outcome,
            ResolveOutcome::Unresolved {
                reason: ResolveReasonCode::ExternalPackage
            }
        );
    }

    #[tokio::test]
    async fn test_workspace_search_fallback() {
        let (dir, resolver) = project();
        let found = touch(dir.path(), "packages/shared/src/env-config.ts");

        let explanation = resolver.explain("env-config", None).await;
        assert_eq!(
            explanation.outcome,
            ResolveOutcome::Found {
                path: found,
                phase: ResolvePhase::WorkspaceSearch
            }
        );
    }

    #[tokio::test]
    async fn test_idempotent_within_ttl() {
        let (dir, resolver) = project();
        fs::write(
            dir.path().join("tsconfig.json"),
            r##"{"compilerOptions": {"paths": {"#/*": ["src/*"]}}}"##,
        )
        .unwrap();
        touch(dir.path(), "src/a.ts");

        let first = resolver.resolve_import("#/a", None).await;
        let second = resolver.resolve_import("#/a", None).await;
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_config_edit_visible_after_ttl() {
        let dir = tempdir().unwrap();
        let config = ResolverConfig::new(dir.path().to_path_buf())
            .with_cache_ttl(Duration::from_millis(50))
            .with_search_limit(0);
        let resolver = Resolver::new(config);
        let tsconfig = dir.path().join("tsconfig.json");
        fs::write(&tsconfig, r#"{"compilerOptions": {"paths": {"x/*": ["one/*"]}}}"#).unwrap();
        let one = touch(dir.path(), "one/m.ts");
        let two = touch(dir.path(), "two/m.ts");

        assert_eq!(resolver.resolve_import("x/m", None).await, Some(one.clone()));

        fs::write(&tsconfig, r#"{"compilerOptions": {"paths": {"x/*": ["two/*"]}}}"#).unwrap();
        // Still cached.
        assert_eq!(resolver.resolve_import("x/m", None).await, Some(one));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(resolver.resolve_import("x/m", None).await, Some(two));
    }

    #[tokio::test]
    async fn test_no_cache_store() {
        let dir = tempdir().unwrap();
        let resolver = Resolver::with_cache(
            ResolverConfig::new(dir.path().to_path_buf()),
            Arc::new(NoConfigCache),
        );
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{"compilerOptions": {"paths": {"@/*": ["src/*"]}}}"#,
        )
        .unwrap();
        let util = touch(dir.path(), "src/util.ts");

        assert_eq!(resolver.resolve_import("@/util", None).await, Some(util));
    }

    #[tokio::test]
    async fn test_resolve_import_uri() {
        let (dir, resolver) = project();
        let app = touch(dir.path(), "src/app.ts");
        let util = touch(dir.path(), "src/util.ts");
        let app_uri = Url::from_file_path(&app).unwrap();

        let resolved = resolver
            .resolve_import_uri("./util", Some(app_uri.as_str()))
            .await;
        assert_eq!(resolved, Url::from_file_path(&util).ok());

        assert_eq!(
            resolver
                .resolve_import_uri("./util", Some("untitled:Untitled-1"))
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_empty_specifier() {
        let (_dir, resolver) = project();
        let explanation = resolver.explain("\"\"", None).await;
        assert_eq!(
            explanation.outcome,
            ResolveOutcome::Unresolved {
                reason: ResolveReasonCode::EmptySpecifier
            }
        );
    }

    #[tokio::test]
    async fn test_trace_lists_phases() {
        let (dir, resolver) = project();
        touch(dir.path(), "src/app.ts");

        let explanation = resolver.explain("react", None).await;
        let names: Vec<_> = explanation.trace.steps.iter().map(|s| s.step).collect();
        assert_eq!(
            names,
            vec![
                steps::NORMALIZE,
                steps::LOAD_CONFIG,
                steps::CLASSIFY,
                steps::MATCH_ALIAS,
                steps::WORKSPACE_SEARCH,
                steps::EXTERNAL
            ]
        );
    }
}
