// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Selection engine.
//!
//! Applies the per-kind/per-change policy to every change record and merges
//! the per-file verdicts into one decision. The policy, by (file kind,
//! change kind):
//!
//! | kind    | added            | modified                  | deleted    |
//! |---------|------------------|---------------------------|------------|
//! | special | full run         | full run                  | full run   |
//! | source  | full run         | tests that used the file  | as modified|
//! | test    | the file itself  | itself + tests that used it | nothing  |
//! | other   | nothing          | nothing                   | nothing    |
//!
//! A full-run escalation absorbs everything else: remaining records are still
//! classified (so every escalation reason is reported), but coverage lookups
//! stop since the decision can no longer narrow.
//!
//! Deleted source uses recorded coverage exactly like modified source: the
//! tests that exercised the file must prove they survive its removal. A file
//! with no recorded coverage contributes nothing; absence of coverage is not
//! evidence of relevance.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::classify::{FileKind, classify};
use crate::config::ClassifyConfig;
use crate::coverage::CoverageIndex;
use crate::error::Error;
use crate::git::{ChangeKind, ChangeRecord};
use crate::locate::Locator;

/// Final verdict for one selection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The whole suite must run.
    RunAll,
    /// Only these test files must run. May be empty: no tests required.
    RunSpecific(BTreeSet<PathBuf>),
}

/// Decision plus the diagnostics gathered while producing it.
#[derive(Debug)]
pub struct Selection {
    pub decision: Decision,
    /// Why a full run was required, one reason per escalating record.
    pub escalations: Vec<String>,
    /// Recorded contexts that no longer resolve to a test file. Each is
    /// excluded from the result; at worst one historical test is missed.
    pub unresolved: BTreeSet<String>,
}

/// Run the selection policy over a change set.
pub fn select(
    changes: &[ChangeRecord],
    rules: &ClassifyConfig,
    index: &CoverageIndex,
    locator: &mut Locator,
) -> Selection {
    let mut tests: BTreeSet<PathBuf> = BTreeSet::new();
    let mut escalations: Vec<String> = Vec::new();
    let mut unresolved: BTreeSet<String> = BTreeSet::new();

    for record in changes {
        let kind = classify(&record.path, rules);
        let display_path = record.path.display();
        tracing::debug!(path = %display_path, kind = ?kind, change = ?record.kind, "classified");

        match (kind, record.kind) {
            (FileKind::Special, _) => {
                let reason = format!("{}: build/config/data file changed", display_path);
                tracing::info!("full run required: {}", reason);
                escalations.push(reason);
            }
            (FileKind::Source, ChangeKind::Added) => {
                let reason = format!("{}: new source file has no recorded coverage", display_path);
                tracing::info!("full run required: {}", reason);
                escalations.push(reason);
            }
            (FileKind::Source, ChangeKind::Modified | ChangeKind::Deleted) => {
                if escalations.is_empty() {
                    resolve_covering_tests(record, index, locator, &mut tests, &mut unresolved);
                }
            }
            (FileKind::Test, ChangeKind::Added) => {
                tests.insert(record.path.clone());
            }
            (FileKind::Test, ChangeKind::Modified) => {
                // The file's own tests, plus tests elsewhere that import it
                // (helpers under the test tree are covered like any source).
                tests.insert(record.path.clone());
                if escalations.is_empty() {
                    resolve_covering_tests(record, index, locator, &mut tests, &mut unresolved);
                }
            }
            (FileKind::Test, ChangeKind::Deleted) => {}
            (FileKind::Other, _) => {}
        }
    }

    let decision = if escalations.is_empty() {
        Decision::RunSpecific(tests)
    } else {
        Decision::RunAll
    };

    Selection {
        decision,
        escalations,
        unresolved,
    }
}

/// Union in the test files whose tests touched `record.path` on the
/// reference build.
fn resolve_covering_tests(
    record: &ChangeRecord,
    index: &CoverageIndex,
    locator: &mut Locator,
    tests: &mut BTreeSet<PathBuf>,
    unresolved: &mut BTreeSet<String>,
) {
    let contexts = index.contexts_for_file(&record.path);
    tracing::debug!(
        path = %record.path.display(),
        contexts = contexts.len(),
        "coverage lookup"
    );

    for context in contexts {
        match locator.locate(&context) {
            Ok(file) => {
                tests.insert(file);
            }
            Err(Error::UnresolvedContext(context)) => {
                tracing::warn!(context = %context, "excluding unresolvable test context");
                unresolved.insert(context);
            }
            Err(e) => {
                // Locator only fails per-context; anything else is a bug but
                // must not abort a selection that can still be answered.
                tracing::warn!(error = %e, "unexpected locator failure");
                unresolved.insert(context);
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
