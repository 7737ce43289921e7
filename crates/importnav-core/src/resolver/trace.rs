//! Resolution tracing for the explain command and debug logging.
//!
//! Provides step-by-step traces of module resolution for debugging
//! and understanding why a specifier resolves to a particular file.

use serde::Serialize;
use std::path::PathBuf;

/// A single step in the resolution trace.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveTraceStep {
    /// Step name (e.g., "normalize", "match_alias", "probe")
    pub step: &'static str,
    /// Whether this step succeeded
    pub ok: bool,
    /// Human-readable description of what happened
    pub detail: String,
    /// File path involved in this step, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl ResolveTraceStep {
    /// Create a new trace step.
    pub fn new(step: &'static str, ok: bool, detail: impl Into<String>) -> Self {
        Self {
            step,
            ok,
            detail: detail.into(),
            path: None,
        }
    }

    /// Set the path for this step.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Complete resolution trace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveTrace {
    /// Ordered list of resolution steps
    pub steps: Vec<ResolveTraceStep>,
}

impl ResolveTrace {
    /// Create a new empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to the trace.
    pub fn add_step(&mut self, step: ResolveTraceStep) {
        self.steps.push(step);
    }

    /// Add a simple success step.
    pub fn success(&mut self, step: &'static str, detail: impl Into<String>) {
        self.steps.push(ResolveTraceStep::new(step, true, detail));
    }

    /// Add a simple failure step.
    pub fn failure(&mut self, step: &'static str, detail: impl Into<String>) {
        self.steps.push(ResolveTraceStep::new(step, false, detail));
    }
}

/// Step names used in resolution tracing.
pub mod steps {
    pub const NORMALIZE: &str = "normalize";
    pub const CLASSIFY: &str = "classify";
    pub const RESOLVE_RELATIVE: &str = "resolve_relative";
    pub const LOAD_CONFIG: &str = "load_config";
    pub const MATCH_ALIAS: &str = "match_alias";
    pub const PROBE: &str = "probe";
    pub const WORKSPACE_SEARCH: &str = "workspace_search";
    pub const EXTERNAL: &str = "external";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_records_in_order() {
        let mut trace = ResolveTrace::new();
        trace.success(steps::NORMALIZE, "'./a' -> ./a");
        trace.add_step(ResolveTraceStep::new(steps::PROBE, false, "no file").with_path("/p/a"));
        trace.failure(steps::EXTERNAL, "lodash");

        let names: Vec<_> = trace.steps.iter().map(|s| s.step).collect();
        assert_eq!(names, vec!["normalize", "probe", "external"]);
        assert_eq!(trace.steps[1].path, Some(PathBuf::from("/p/a")));
        assert!(!trace.steps[2].ok);
    }

    #[test]
    fn test_path_omitted_from_json_when_absent() {
        let step = ResolveTraceStep::new(steps::CLASSIFY, true, "bare");
        let json = serde_json::to_value(&step).unwrap();
        assert!(json.get("path").is_none());
        assert_eq!(json["step"], "classify");
    }
}
