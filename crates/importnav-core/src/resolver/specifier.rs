//! Specifier normalization and classification.

use serde::Serialize;

/// How a specifier will be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecifierKind {
    /// Begins with `.`: resolved against the requesting file's directory.
    Relative,
    /// Matches a bundler alias or path-mapping key.
    Aliased,
    /// Anything else. External unless a workspace file happens to match.
    Bare,
}

impl SpecifierKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Aliased => "aliased",
            Self::Bare => "bare",
        }
    }
}

impl std::fmt::Display for SpecifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip exactly one layer of matching straight quotes.
///
/// `'./a'` and `"./a"` become `./a`. Anything else, including mismatched
/// quotes or a lone quote character, is returned unchanged.
#[must_use]
pub fn normalize(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'\'' || first == b'"') {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

/// Whether a normalized specifier is relative.
#[must_use]
pub fn is_relative(spec: &str) -> bool {
    spec.starts_with('.')
}
