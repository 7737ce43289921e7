use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that turns on step-by-step resolution tracing.
pub const DEBUG_ENV: &str = "IMPORTNAV_DEBUG";

/// How long a loaded config snapshot stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Maximum number of hits the workspace-wide fallback search collects.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Glob for dependency trees skipped by the workspace search.
pub const DEFAULT_SEARCH_EXCLUDE: &str = "**/node_modules/**";

/// Suffixes tried against every candidate base path, highest priority first.
pub const DEFAULT_PROBE_SUFFIXES: &[&str] = &[
    "",
    ".ts",
    ".tsx",
    ".js",
    ".jsx",
    ".mjs",
    ".cjs",
    ".mts",
    ".cts",
    ".vue",
    ".svelte",
    ".json",
    ".css",
    ".scss",
    ".sass",
    ".less",
    ".html",
    ".md",
    "/index.ts",
    "/index.tsx",
    "/index.js",
    "/index.jsx",
    "/index.vue",
];

/// Resolver configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ResolverConfig {
    /// Workspace root. Config discovery never walks above it.
    pub project_root: PathBuf,

    /// Freshness bound for cached config snapshots.
    pub cache_ttl: Duration,

    /// Probe suffixes (in priority order).
    pub suffixes: Vec<String>,

    /// Result cap for the workspace-wide fallback search.
    pub search_limit: usize,

    /// Exclude glob for the workspace-wide fallback search.
    pub search_exclude: String,

    /// Emit verbose trace logging of each resolution phase.
    pub debug: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            project_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            cache_ttl: DEFAULT_CACHE_TTL,
            suffixes: DEFAULT_PROBE_SUFFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            search_exclude: DEFAULT_SEARCH_EXCLUDE.to_string(),
            debug: false,
        }
    }
}

impl ResolverConfig {
    /// Create a new config rooted at the given project directory.
    #[must_use]
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root: importnav_util::path::normalize(&project_root),
            ..Default::default()
        }
    }

    /// Create a config rooted at `project_root`, picking up the debug toggle
    /// from [`DEBUG_ENV`].
    #[must_use]
    pub fn from_env(project_root: PathBuf) -> Self {
        let debug = std::env::var(DEBUG_ENV).is_ok_and(|v| env_flag(&v));
        Self::new(project_root).with_debug(debug)
    }

    /// Set the cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Replace the probe suffix list.
    #[must_use]
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the workspace search result cap.
    #[must_use]
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set the workspace search exclude glob.
    #[must_use]
    pub fn with_search_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.search_exclude = exclude.into();
        self
    }

    /// Set the debug trace flag.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Interpret an environment-style boolean (`1`, `true`, `yes`, `on`).
#[must_use]
pub fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
