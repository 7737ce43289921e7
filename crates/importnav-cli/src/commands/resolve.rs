use importnav_core::{Resolver, SCHEMA_VERSION};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ResolveOutput<'a> {
    schema_version: u32,
    specifier: &'a str,
    resolved: Option<PathBuf>,
}

/// Run the resolve command. Returns whether the specifier resolved.
pub async fn run(
    resolver: &Resolver,
    specifier: &str,
    from: Option<&Path>,
    json: bool,
) -> Result<bool> {
    let resolved = resolver.resolve_import(specifier, from).await;
    let found = resolved.is_some();

    if json {
        let out = ResolveOutput {
            schema_version: SCHEMA_VERSION,
            specifier,
            resolved,
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
    } else if let Some(path) = resolved {
        println!("{}", path.display());
    } else {
        eprintln!("unresolved: {specifier}");
    }

    Ok(found)
}
