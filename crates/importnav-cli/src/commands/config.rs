use importnav_core::{Resolver, SCHEMA_VERSION};
use miette::{IntoDiagnostic, Result};
use std::path::Path;

/// Run the config command: print the alias configuration a file would see.
pub async fn run(resolver: &Resolver, from: Option<&Path>, json: bool) -> Result<()> {
    let snapshot = resolver.snapshot(from).await;

    if json {
        let mut value = serde_json::to_value(snapshot.as_ref()).into_diagnostic()?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("schema_version".to_string(), SCHEMA_VERSION.into());
            obj.insert(
                "resolver".to_string(),
                serde_json::to_value(resolver.config()).into_diagnostic()?,
            );
        }
        println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        return Ok(());
    }

    let show = |p: Option<&Path>| p.map_or_else(|| "(none)".to_string(), |p| p.display().to_string());

    println!("Project root:   {}", snapshot.project_root.display());
    println!("Path mapping:   {}", show(snapshot.path_mapping_file.as_deref()));
    println!("Bundler config: {}", show(snapshot.bundler_file.as_deref()));
    println!("Base URL:       {}", show(snapshot.base_url.as_deref()));
    println!("Mapping base:   {}", snapshot.paths_base.display());
    println!("Cache TTL:      {}s", resolver.config().cache_ttl.as_secs());
    println!("Search limit:   {}", resolver.config().search_limit);

    if !snapshot.paths().is_empty() {
        println!("\nPaths:");
        for (key, targets) in snapshot.paths() {
            println!("  {key} -> {}", targets.join(", "));
        }
    }
    if !snapshot.aliases().is_empty() {
        println!("\nAliases:");
        for (key, target) in snapshot.aliases() {
            println!("  {key} -> {}", target.display());
        }
    }

    Ok(())
}
