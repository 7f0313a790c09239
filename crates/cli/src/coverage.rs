// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reference-build coverage index.
//!
//! The reference build runs the full suite under coverage recording with
//! per-test execution contexts enabled, and publishes the resulting SQLite
//! store at `<coverage_dir>/<project>/<build>/.coverage`. This module reads
//! that store behind a narrow read-only trait and folds it into an in-memory
//! file→contexts index held immutable for the rest of the run.
//!
//! Store schema (coverage.py):
//! - `file(id, path)`: paths as recorded on the reference build machine
//! - `context(id, context)`: qualified test names; empty for non-test code
//! - `arc(file_id, context_id, ...)`: branch coverage (the default)
//! - `line_bits(file_id, context_id, ...)`: line coverage

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::error::{Error, Result};

/// File name of the persisted coverage store.
pub const COVERAGE_FILE: &str = ".coverage";

/// Read-only query boundary over a persisted coverage store.
///
/// One call, one answer: every (executed file, test context) pair the
/// reference build observed. Keeping the surface this narrow lets the index
/// be backed by any key-addressable store.
pub trait ContextStore {
    fn file_contexts(&self) -> Result<Vec<(String, String)>>;
}

/// Coverage store backed by a coverage.py SQLite database.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
    line_coverage: bool,
}

impl SqliteStore {
    /// Open the store read-only. The index must reflect exactly one
    /// historical run, so nothing here ever writes.
    pub fn open(path: &Path, line_coverage: bool) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::IndexUnavailable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            line_coverage,
        })
    }

    fn store_err(&self, e: rusqlite::Error) -> Error {
        Error::IndexUnavailable {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

impl ContextStore for SqliteStore {
    fn file_contexts(&self) -> Result<Vec<(String, String)>> {
        // The empty-context filter drops lines executed outside any test
        // (import time, fixtures), which the recorder stores under ''.
        let table = if self.line_coverage { "line_bits" } else { "arc" };
        let sql = format!(
            "SELECT DISTINCT file.path, context.context \
             FROM {table}, file, context \
             WHERE {table}.file_id = file.id \
               AND {table}.context_id = context.id \
               AND context.context != ''"
        );

        let mut stmt = self.conn.prepare(&sql).map_err(|e| self.store_err(e))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| self.store_err(e))?;

        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row.map_err(|e| self.store_err(e))?);
        }
        Ok(pairs)
    }
}

/// Immutable file→test-contexts snapshot for one selection run.
#[derive(Debug, Default)]
pub struct CoverageIndex {
    tests_touching_file: BTreeMap<String, BTreeSet<String>>,
}

impl CoverageIndex {
    /// Build the index from a store's full (file, context) relation.
    pub fn from_store(store: &dyn ContextStore) -> Result<Self> {
        Ok(Self::from_pairs(store.file_contexts()?))
    }

    /// Build the index from in-memory pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut tests_touching_file: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (file, context) in pairs {
            tests_touching_file.entry(file).or_default().insert(context);
        }
        Self {
            tests_touching_file,
        }
    }

    /// All test contexts that executed `path` on the reference build.
    ///
    /// The store records paths as seen on the build machine (typically
    /// absolute); the query path is repo-relative, so a key matches when it
    /// equals the path or ends with `/<path>`. Multiple matching keys union.
    pub fn contexts_for_file(&self, path: &Path) -> BTreeSet<String> {
        let needle = path.to_string_lossy();
        let suffix = format!("/{}", needle);

        let mut contexts = BTreeSet::new();
        for (key, tests) in &self.tests_touching_file {
            if key.as_str() == needle.as_ref() || key.ends_with(&suffix) {
                contexts.extend(tests.iter().cloned());
            }
        }
        contexts
    }

    /// Number of distinct files with recorded coverage.
    pub fn file_count(&self) -> usize {
        self.tests_touching_file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests_touching_file.is_empty()
    }
}

/// Locate the `.coverage` store for a project.
///
/// Layout: `<coverage_dir>/<project>/<build>/.coverage`. Without an explicit
/// build number the most recently modified build directory wins (ties broken
/// by name, descending, so repeated runs stay deterministic); a project
/// directory holding `.coverage` directly is accepted too.
pub fn resolve_store_path(
    coverage_dir: &Path,
    project: &str,
    build: Option<&str>,
) -> Result<PathBuf> {
    let project_dir = coverage_dir.join(project);
    if !project_dir.is_dir() {
        return Err(Error::IndexUnavailable {
            path: project_dir,
            message: format!("no coverage data recorded for project '{}'", project),
        });
    }

    let store = match build {
        Some(build) => project_dir.join(build).join(COVERAGE_FILE),
        None => match latest_build_dir(&project_dir)? {
            Some(dir) => dir.join(COVERAGE_FILE),
            None => project_dir.join(COVERAGE_FILE),
        },
    };

    if !store.is_file() {
        return Err(Error::IndexUnavailable {
            path: store,
            message: "coverage store missing; regenerate it with a full-suite reference build"
                .to_string(),
        });
    }

    tracing::info!(store = %store.display(), "using coverage store");
    Ok(store)
}

/// Most recently modified subdirectory, if any.
fn latest_build_dir(project_dir: &Path) -> Result<Option<PathBuf>> {
    let entries = std::fs::read_dir(project_dir).map_err(|e| Error::Io {
        path: project_dir.to_path_buf(),
        source: e,
    })?;

    let mut builds: Vec<(std::time::SystemTime, String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Io {
            path: project_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let mtime = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
        builds.push((mtime, entry.file_name().to_string_lossy().to_string(), path));
    }

    builds.sort_by(|a, b| (&b.0, &b.1).cmp(&(&a.0, &a.1)));
    Ok(builds.into_iter().next().map(|(_, _, path)| path))
}

#[cfg(test)]
#[path = "coverage_tests.rs"]
mod tests;
