use std::path::PathBuf;
use thiserror::Error;

/// Core error type for importnav operations.
///
/// These never reach callers of the resolver: every variant is absorbed at
/// the component boundary where it occurs and degrades to an empty config
/// source or a "not found" probe.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No usable resolve.alias block in {path}: {reason}")]
    AliasBlock { path: PathBuf, reason: String },
}
