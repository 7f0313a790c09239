// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Git change-set extraction.
//!
//! Uses git2 (libgit2) for all git operations to avoid subprocess overhead.
//!
//! Two comparison modes:
//! - worktree: base tree vs working directory (plus index), for local
//!   usage; uncommitted changes count.
//! - committed: merge-base(HEAD, base) vs HEAD, for CI; only what the
//!   branch actually committed counts.
//!
//! Rename detection is left off: a rename surfaces as a Deleted record for
//! the old path plus an Added record for the new path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use git2::{Delta, DiffOptions, Repository};

use crate::error::{Error, Result};

/// How a path changed relative to the base reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// One changed path. Paths are repo-relative with forward slashes, as
/// reported by git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Check if a path is in a git repository.
pub fn is_git_repo(root: &Path) -> bool {
    Repository::discover(root).is_ok()
}

fn open_repo(root: &Path) -> Result<Repository> {
    Repository::discover(root).map_err(|e| Error::DiffUnavailable {
        message: format!("{} is not a git repository: {}", root.display(), e.message()),
    })
}

fn resolve_tree<'r>(repo: &'r Repository, reference: &str) -> Result<git2::Tree<'r>> {
    repo.revparse_single(reference)
        .and_then(|obj| obj.peel_to_tree())
        .map_err(|e| Error::DiffUnavailable {
            message: format!("cannot resolve base reference '{}': {}", reference, e.message()),
        })
}

/// Changed files between the base reference and the working tree (including
/// the index). Local mode: uncommitted edits count.
pub fn changed_in_worktree(root: &Path, base: &str) -> Result<Vec<ChangeRecord>> {
    let repo = open_repo(root)?;
    let base_tree = resolve_tree(&repo, base)?;

    let mut opts = DiffOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);

    let diff = repo
        .diff_tree_to_workdir_with_index(Some(&base_tree), Some(&mut opts))
        .map_err(|e| Error::DiffUnavailable {
            message: format!("diff failed: {}", e.message()),
        })?;

    Ok(collect_records(&diff))
}

/// Changed files committed on the current branch: merge-base(HEAD, base)
/// vs HEAD. CI mode: only committed changes count.
pub fn changed_in_commits(root: &Path, base: &str) -> Result<Vec<ChangeRecord>> {
    let repo = open_repo(root)?;

    let base_oid = repo
        .revparse_single(base)
        .map_err(|e| Error::DiffUnavailable {
            message: format!("cannot resolve base reference '{}': {}", base, e.message()),
        })?
        .id();
    let head_oid = repo
        .head()
        .ok()
        .and_then(|h| h.target())
        .ok_or_else(|| Error::DiffUnavailable {
            message: "HEAD has no target (unborn branch?)".to_string(),
        })?;

    let merge_base = repo
        .merge_base(head_oid, base_oid)
        .map_err(|e| Error::DiffUnavailable {
            message: format!("no merge base between HEAD and '{}': {}", base, e.message()),
        })?;

    let old_tree = repo
        .find_commit(merge_base)
        .and_then(|c| c.tree())
        .map_err(|e| Error::DiffUnavailable {
            message: format!("cannot read merge-base tree: {}", e.message()),
        })?;
    let new_tree = repo
        .head()
        .and_then(|h| h.peel_to_tree())
        .map_err(|e| Error::DiffUnavailable {
            message: format!("cannot read HEAD tree: {}", e.message()),
        })?;

    let diff = repo
        .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
        .map_err(|e| Error::DiffUnavailable {
            message: format!("diff failed: {}", e.message()),
        })?;

    Ok(collect_records(&diff))
}

/// Flatten diff deltas into change records, in diff order, deduplicated by
/// path (first occurrence wins).
fn collect_records(diff: &git2::Diff<'_>) -> Vec<ChangeRecord> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut records = Vec::new();

    fn push(
        seen: &mut HashSet<PathBuf>,
        records: &mut Vec<ChangeRecord>,
        path: Option<&Path>,
        kind: ChangeKind,
    ) {
        if let Some(path) = path
            && seen.insert(path.to_path_buf())
        {
            records.push(ChangeRecord {
                path: path.to_path_buf(),
                kind,
            });
        }
    }

    for delta in diff.deltas() {
        match delta.status() {
            Delta::Added | Delta::Untracked | Delta::Copied => {
                push(&mut seen, &mut records, delta.new_file().path(), ChangeKind::Added);
            }
            Delta::Deleted => {
                push(&mut seen, &mut records, delta.old_file().path(), ChangeKind::Deleted);
            }
            Delta::Modified | Delta::Typechange => {
                push(&mut seen, &mut records, delta.new_file().path(), ChangeKind::Modified);
            }
            // Rename detection is off, but stay correct if a caller enables
            // it: old path dies, new path is born.
            Delta::Renamed => {
                push(&mut seen, &mut records, delta.old_file().path(), ChangeKind::Deleted);
                push(&mut seen, &mut records, delta.new_file().path(), ChangeKind::Added);
            }
            // Unmodified, ignored, unreadable, conflicted: nothing to select
            _ => {}
        }
    }

    tracing::debug!(count = records.len(), "collected change records");
    records
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
