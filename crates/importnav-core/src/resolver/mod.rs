//! Import specifier resolver.
//!
//! Turns a specifier written in a source file (`./util`, `@/assets/logo.svg`,
//! `lodash`) into a file on disk, or reports that it names an external
//! package. Resolution never fails loudly: unreadable or malformed project
//! configuration degrades to "no aliases".

mod bundler;
mod cache;
mod engine;
mod loader;
mod matcher;
mod probe;
mod search;
mod specifier;
pub mod trace;
mod tsconfig;

pub use bundler::{extract_aliases, find_bundler_config, load_aliases, BUNDLER_CONFIG_FILES};
pub use cache::{ConfigCache, NoConfigCache, TtlConfigCache};
pub use engine::{
    Explanation, ResolveOutcome, ResolvePhase, ResolveReasonCode, Resolver,
};
pub use loader::{ConfigLoader, ConfigSnapshot};
pub use matcher::{compile_mappings, match_aliases, CompiledMapping, PathPattern};
pub use probe::{probe, probe_suffixes, scan_siblings};
pub use search::{name_prefix_glob, WalkdirSearch, WorkspaceSearch};
pub use specifier::SpecifierKind;
pub use trace::{steps as trace_steps, ResolveTrace, ResolveTraceStep};
pub use tsconfig::{find_path_mapping_config, load_path_mapping, PathMapping, PATH_MAPPING_FILES};
