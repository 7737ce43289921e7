use importnav_core::{Explanation, ResolveOutcome, Resolver, SCHEMA_VERSION};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Serialize)]
struct ExplainOutput<'a> {
    schema_version: u32,
    #[serde(flatten)]
    explanation: &'a Explanation,
}

/// Run the explain command.
///
/// When `json` is true, outputs a single JSON object to stdout.
/// Otherwise, outputs the outcome followed by one line per trace step.
pub async fn run(
    resolver: &Resolver,
    specifier: &str,
    from: Option<&Path>,
    json: bool,
) -> Result<()> {
    let explanation = resolver.explain(specifier, from).await;

    if json {
        let out = ExplainOutput {
            schema_version: SCHEMA_VERSION,
            explanation: &explanation,
        };
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
        return Ok(());
    }

    print_human(&explanation)
}

fn print_human(explanation: &Explanation) -> Result<()> {
    let mut out = io::stdout().lock();

    w(&mut out, &format!("Specifier: {}\n", explanation.specifier))?;
    w(&mut out, &format!("Kind:      {}\n", explanation.kind))?;
    match &explanation.outcome {
        ResolveOutcome::Found { path, phase } => {
            w(&mut out, &format!("Resolved:  {} (via {phase})\n", path.display()))?;
        }
        ResolveOutcome::Unresolved { reason } => {
            w(&mut out, &format!("Unresolved: {reason}\n"))?;
        }
    }

    if !explanation.candidates.is_empty() {
        w(&mut out, "\nCandidates:\n")?;
        for candidate in &explanation.candidates {
            w(&mut out, &format!("  {}\n", candidate.display()))?;
        }
    }

    w(&mut out, "\nTrace:\n")?;
    for step in &explanation.trace.steps {
        let mark = if step.ok { "ok  " } else { "fail" };
        let path = step
            .path
            .as_ref()
            .map(|p| format!(" [{}]", p.display()))
            .unwrap_or_default();
        w(
            &mut out,
            &format!("  {mark} {:<16} {}{path}\n", step.step, step.detail),
        )?;
    }

    Ok(())
}

fn w(out: &mut impl Write, s: &str) -> Result<()> {
    out.write_all(s.as_bytes()).into_diagnostic()
}
