use importnav_core::version::{version_string, SCHEMA_VERSION};
use miette::{IntoDiagnostic, Result};

pub fn run(json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "version": version_string(),
        });
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
