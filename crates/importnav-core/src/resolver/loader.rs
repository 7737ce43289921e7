//! Config loading: path-mapping config plus bundler aliases, cached per key.

use super::bundler::{find_bundler_config, load_aliases};
use super::cache::ConfigCache;
use super::matcher::{compile_mappings, longest_first, CompiledMapping};
use super::tsconfig::{find_path_mapping_config, load_path_mapping};
use importnav_util::path::normalize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Immutable view of the configuration in effect for one resolution context.
///
/// Every stored path is absolute and lexically normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    /// Workspace root the snapshot was loaded for.
    pub project_root: PathBuf,
    /// The path-mapping config file read, if any.
    pub path_mapping_file: Option<PathBuf>,
    /// The bundler config file read, if any.
    pub bundler_file: Option<PathBuf>,
    /// Absolute `baseUrl` from the path-mapping config.
    pub base_url: Option<PathBuf>,
    /// Directory that relative mapping targets are joined onto: `baseUrl`
    /// if declared, else the path-mapping config's directory, else the
    /// project root.
    pub paths_base: PathBuf,
    /// Path-mapping table, pattern → replacement patterns, in file order.
    paths: Vec<(String, Vec<String>)>,
    /// Bundler alias table, literal prefix → absolute target, longest first.
    aliases: Vec<(String, PathBuf)>,
    /// `paths` compiled once, longest key first.
    #[serde(skip)]
    mappings: Vec<CompiledMapping>,
}

impl ConfigSnapshot {
    /// Snapshot with no configuration at all.
    #[must_use]
    pub fn empty(project_root: PathBuf) -> Self {
        Self {
            paths_base: project_root.clone(),
            project_root,
            path_mapping_file: None,
            bundler_file: None,
            base_url: None,
            paths: Vec::new(),
            aliases: Vec::new(),
            mappings: Vec::new(),
        }
    }

    /// Replace the path-mapping table, compiling its keys.
    pub fn set_paths(&mut self, paths: Vec<(String, Vec<String>)>) {
        self.mappings = compile_mappings(&paths);
        self.paths = paths;
    }

    /// Replace the bundler alias table.
    pub fn set_aliases(&mut self, mut aliases: Vec<(String, PathBuf)>) {
        aliases.sort_by(|a, b| longest_first(&a.0, &b.0));
        self.aliases = aliases;
    }

    #[must_use]
    pub fn paths(&self) -> &[(String, Vec<String>)] {
        &self.paths
    }

    /// Bundler aliases, longest key first.
    #[must_use]
    pub fn aliases(&self) -> &[(String, PathBuf)] {
        &self.aliases
    }

    /// Compiled path mappings, longest key first.
    #[must_use]
    pub fn mappings(&self) -> &[CompiledMapping] {
        &self.mappings
    }

    /// Whether neither source contributed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.aliases.is_empty()
    }
}

/// Loads [`ConfigSnapshot`]s for a project, going through a [`ConfigCache`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
    cache: Arc<dyn ConfigCache>,
}

impl ConfigLoader {
    /// Create a loader for `root` backed by `cache`.
    #[must_use]
    pub fn new(root: &Path, cache: Arc<dyn ConfigCache>) -> Self {
        Self {
            root: normalize(root),
            cache,
        }
    }

    /// The project root this loader serves.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache key for a context: the most specific path-mapping config, or the
    /// project root when there is none.
    #[must_use]
    pub fn cache_key(&self, requesting_file: Option<&Path>) -> PathBuf {
        find_path_mapping_config(&self.root, requesting_file).unwrap_or_else(|| self.root.clone())
    }

    /// Load the snapshot for a context. Never fails: a missing or malformed
    /// source simply contributes nothing.
    ///
    /// Blocking: performs filesystem reads on a cache miss.
    #[must_use]
    pub fn load(&self, requesting_file: Option<&Path>) -> Arc<ConfigSnapshot> {
        let mapping_file = find_path_mapping_config(&self.root, requesting_file);
        let key = mapping_file.clone().unwrap_or_else(|| self.root.clone());

        if let Some(snapshot) = self.cache.get(&key) {
            trace!(key = %key.display(), "config cache hit");
            return snapshot;
        }

        debug!(key = %key.display(), "loading config snapshot");
        let snapshot = Arc::new(self.read_snapshot(mapping_file));
        self.cache.put(key, Arc::clone(&snapshot));
        snapshot
    }

    fn read_snapshot(&self, mapping_file: Option<PathBuf>) -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot::empty(self.root.clone());

        if let Some(file) = mapping_file {
            match load_path_mapping(&file) {
                Ok(mapping) => {
                    let config_dir = file.parent().map_or_else(|| self.root.clone(), normalize);
                    snapshot.paths_base = mapping.base_url.clone().unwrap_or(config_dir);
                    snapshot.base_url = mapping.base_url;
                    snapshot.set_paths(mapping.paths.into_iter().collect());
                    debug!(
                        file = %file.display(),
                        entries = snapshot.paths().len(),
                        "loaded path mapping"
                    );
                }
                Err(err) => debug!(error = %err, "ignoring path-mapping config"),
            }
            snapshot.path_mapping_file = Some(file);
        }

        if let Some(file) = find_bundler_config(&self.root) {
            match load_aliases(&file, &self.root) {
                Ok(aliases) => {
                    debug!(
                        file = %file.display(),
                        entries = aliases.len(),
                        "loaded bundler aliases"
                    );
                    snapshot.set_aliases(aliases);
                }
                Err(err) => debug!(error = %err, "ignoring bundler aliases"),
            }
            snapshot.bundler_file = Some(file);
        }

        snapshot
    }
}
