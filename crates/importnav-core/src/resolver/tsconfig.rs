//! Path-mapping config discovery and parsing (`tsconfig.json` / `jsconfig.json`).
//!
//! Only `compilerOptions.baseUrl` and `compilerOptions.paths` are read.
//! `extends` is not followed: a config that inherits its `paths` from a
//! parent contributes nothing.

use super::bundler::strip_comments;
use crate::error::Error;
use importnav_util::path::{is_within, join_normalized, normalize};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Path-mapping config names tested at each directory level, in order.
pub const PATH_MAPPING_FILES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// Parsed path-mapping config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMapping {
    /// Absolute `baseUrl`, if the config declares one.
    pub base_url: Option<PathBuf>,
    /// Pattern → replacement patterns, verbatim from the config.
    pub paths: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(rename = "compilerOptions")]
    compiler_options: Option<RawCompilerOptions>,
}

#[derive(Deserialize)]
struct RawCompilerOptions {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    paths: Option<BTreeMap<String, Value>>,
}

fn config_in(dir: &Path) -> Option<PathBuf> {
    PATH_MAPPING_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Locate the most specific path-mapping config for a requesting file.
///
/// Walks from the requesting file's directory up to `root` (inclusive), then
/// falls back to `root` itself. A requesting file outside `root` skips the walk.
#[must_use]
pub fn find_path_mapping_config(root: &Path, requesting_file: Option<&Path>) -> Option<PathBuf> {
    let root = normalize(root);

    if let Some(file) = requesting_file {
        let file = normalize(file);
        if is_within(&file, &root) {
            let mut current = file.parent();
            while let Some(dir) = current {
                if let Some(found) = config_in(dir) {
                    return Some(found);
                }
                if dir == root {
                    break;
                }
                current = dir.parent();
            }
        }
    }

    config_in(&root)
}

/// Read and parse a path-mapping config.
///
/// Comments, trailing commas and a leading BOM are tolerated.
pub fn load_path_mapping(path: &Path) -> Result<PathMapping, Error> {
    let text =
        importnav_util::fs::read_to_string_lossy(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

    // Editors on Windows like to prefix a BOM; serde_json rejects it.
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let json = strip_trailing_commas(&strip_comments(text));
    let raw: RawConfig = serde_json::from_str(&json).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    let config_dir = path.parent().unwrap_or(Path::new("."));
    let Some(options) = raw.compiler_options else {
        return Ok(PathMapping::default());
    };

    let base_url = options
        .base_url
        .map(|base| join_normalized(config_dir, base));

    let paths = options
        .paths
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(pattern, targets)| {
            let Value::Array(items) = targets else {
                return None;
            };
            let targets: Vec<String> = items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            Some((pattern, targets))
        })
        .collect();

    Ok(PathMapping { base_url, paths })
}

/// Drop commas that directly precede `}` or `]`, outside strings.
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}
