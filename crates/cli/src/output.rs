// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Decision rendering and the test-list file.
//!
//! The runner-facing contract: on a specific selection the output file holds
//! one repo-relative test path per line, sorted, and is written even when
//! empty. On a full-run decision the file is NOT written; its absence tells
//! the runner to execute the whole suite.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::engine::{Decision, Selection};
use crate::error::{Error, Result};

/// Write the selected test files, one per line, sorted.
pub fn write_test_list(path: &Path, selection: &Selection) -> Result<()> {
    let Decision::RunSpecific(tests) = &selection.decision else {
        return Ok(());
    };

    let mut file = std::fs::File::create(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    for test in tests {
        writeln!(file, "{}", test.display()).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    tracing::info!(path = %path.display(), tests = tests.len(), "wrote test list");
    Ok(())
}

/// Human-readable rendering.
pub fn render_text(selection: &Selection) -> String {
    let mut out = String::new();

    match &selection.decision {
        Decision::RunAll => {
            out.push_str("full test run required\n");
            for reason in &selection.escalations {
                out.push_str(&format!("  - {}\n", reason));
            }
        }
        Decision::RunSpecific(tests) if tests.is_empty() => {
            out.push_str("no tests required\n");
        }
        Decision::RunSpecific(tests) => {
            out.push_str(&format!("{} test file(s) selected\n", tests.len()));
            for test in tests {
                out.push_str(&format!("  {}\n", test.display()));
            }
        }
    }

    out
}

#[derive(Serialize)]
struct JsonDecision<'s> {
    decision: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reasons: Vec<&'s str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unresolved: Vec<&'s str>,
}

/// Machine-readable rendering.
pub fn render_json(selection: &Selection) -> Result<String> {
    let doc = match &selection.decision {
        Decision::RunAll => JsonDecision {
            decision: "run-all",
            reasons: selection.escalations.iter().map(String::as_str).collect(),
            tests: None,
            unresolved: Vec::new(),
        },
        Decision::RunSpecific(tests) => JsonDecision {
            decision: "run-specific",
            reasons: Vec::new(),
            tests: Some(tests.iter().map(|t| t.display().to_string()).collect()),
            unresolved: selection.unresolved.iter().map(String::as_str).collect(),
        },
    };

    serde_json::to_string_pretty(&doc).map_err(|e| Error::Internal(e.to_string()))
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
