//! Version constants shared by the CLI's human and JSON output.

/// Crate version, from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the JSON documents printed by `resolve`, `explain`, `config`
/// and `version`. Bump on incompatible field changes.
pub const SCHEMA_VERSION: u32 = 1;

/// `importnav <version>`, as printed by `importnav version`.
#[must_use]
pub fn version_string() -> String {
    format!("importnav {VERSION}")
}
