// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test-context resolution.
//!
//! A coverage recorder labels each executed line with the qualified name of
//! the running test ("tests.test_orders.test_cancel"). That name is not a
//! file reference: the same function name can be defined in several files,
//! and dotted module paths do not always round-trip to paths on disk. The
//! [`Locator`] turns such identifiers into concrete test files.
//!
//! Resolution is backed by a definition index (name → files defining it)
//! built once per run by scanning the configured test directories, so lookups
//! never rescan the filesystem. Outcomes are memoized per identifier.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use regex::Regex;

use crate::config::ClassifyConfig;
use crate::error::{Error, Result};

/// Matches top-level and nested `def`/`class` statements.
const DEFINITION_PATTERN: &str =
    r"(?m)^[ \t]*(?:async[ \t]+)?def[ \t]+([A-Za-z_]\w*)|^[ \t]*class[ \t]+([A-Za-z_]\w*)";

/// Name → test files defining that name (paths repo-relative, sorted).
#[derive(Debug, Default)]
pub struct DefinitionIndex {
    by_name: HashMap<String, Vec<PathBuf>>,
}

impl DefinitionIndex {
    /// Scan every test file under the configured test prefixes and index the
    /// names it defines.
    ///
    /// Files are scanned in parallel but merged in sorted path order, so the
    /// index is identical to a serial build.
    pub fn build(root: &Path, rules: &ClassifyConfig) -> Result<Self> {
        let pattern = definition_regex()?;
        let files = test_files(root, rules);

        let scanned: Vec<(PathBuf, Vec<String>)> = files
            .par_iter()
            .map(|rel| {
                let names = match std::fs::read_to_string(root.join(rel)) {
                    Ok(content) => definition_names(&pattern, &content),
                    Err(e) => {
                        tracing::warn!(file = %rel.display(), error = %e, "skipping unreadable test file");
                        Vec::new()
                    }
                };
                (rel.clone(), names)
            })
            .collect();

        let mut by_name: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for (file, names) in scanned {
            for name in names {
                by_name.entry(name).or_default().push(file.clone());
            }
        }

        tracing::debug!(
            files = files.len(),
            names = by_name.len(),
            "built test definition index"
        );
        Ok(Self { by_name })
    }

    /// Build from (name, file) entries directly.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        let mut by_name: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for (name, file) in entries {
            by_name.entry(name).or_default().push(file);
        }
        for files in by_name.values_mut() {
            files.sort();
            files.dedup();
        }
        Self { by_name }
    }

    fn candidates(&self, name: &str) -> &[PathBuf] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn definition_regex() -> Result<Regex> {
    Regex::new(DEFINITION_PATTERN).map_err(|e| Error::Internal(e.to_string()))
}

/// Names defined in one file, deduplicated.
fn definition_names(pattern: &Regex, content: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for captures in pattern.captures_iter(content) {
        if let Some(name) = captures.get(1).or_else(|| captures.get(2)) {
            names.insert(name.as_str().to_string());
        }
    }
    names.into_iter().collect()
}

/// Repo-relative paths of all test files, sorted.
fn test_files(root: &Path, rules: &ClassifyConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for prefix in &rules.test_prefixes {
        let dir = root.join(prefix.trim_end_matches('/'));
        if !dir.is_dir() {
            continue;
        }

        for entry in WalkBuilder::new(&dir).build().flatten() {
            let path = entry.path();
            if !path.is_file() || !has_source_extension(path, rules) {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(root) {
                files.push(rel.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn has_source_extension(path: &Path, rules: &ClassifyConfig) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let dotted = format!(".{}", ext.to_string_lossy());
    rules.source_extensions.iter().any(|e| *e == dotted)
}

/// Resolves test-context identifiers to the files defining them.
pub struct Locator {
    index: DefinitionIndex,
    source_extensions: Vec<String>,
    root: PathBuf,
    cache: HashMap<String, Option<PathBuf>>,
}

impl Locator {
    /// Build a locator for `root`, scanning its test directories once.
    pub fn new(root: &Path, rules: &ClassifyConfig) -> Result<Self> {
        Ok(Self {
            index: DefinitionIndex::build(root, rules)?,
            source_extensions: rules.source_extensions.clone(),
            root: root.to_path_buf(),
            cache: HashMap::new(),
        })
    }

    /// Locator over a prebuilt index (no filesystem scan).
    pub fn with_index(index: DefinitionIndex, root: &Path, rules: &ClassifyConfig) -> Self {
        Self {
            index,
            source_extensions: rules.source_extensions.clone(),
            root: root.to_path_buf(),
            cache: HashMap::new(),
        }
    }

    /// Resolve a context identifier to the repo-relative test file defining
    /// it. Each identifier is resolved at most once per run; repeat calls are
    /// served from the cache, including negative outcomes.
    pub fn locate(&mut self, context: &str) -> Result<PathBuf> {
        if let Some(cached) = self.cache.get(context) {
            return cached
                .clone()
                .ok_or_else(|| Error::UnresolvedContext(context.to_string()));
        }

        let resolved = self.resolve(context);
        self.cache.insert(context.to_string(), resolved.clone());
        resolved.ok_or_else(|| Error::UnresolvedContext(context.to_string()))
    }

    fn resolve(&self, context: &str) -> Option<PathBuf> {
        // Qualified names since coverage 5.0a6; older recorders stored the
        // bare function name.
        let (prefix, name) = match context.rsplit_once('.') {
            Some((prefix, name)) => (prefix, name),
            None => ("", context),
        };

        let candidates = self.index.candidates(name);

        // Direct structural mapping: the qualifying prefix often IS the file,
        // dots for slashes.
        if !prefix.is_empty() {
            let stem = prefix.replace('.', "/");
            for ext in &self.source_extensions {
                let direct = PathBuf::from(format!("{}{}", stem, ext));
                if candidates.contains(&direct) {
                    return Some(direct);
                }
                if self.defines_name(&direct, name) {
                    return Some(direct);
                }
            }
        }

        match candidates {
            [] => None,
            [only] => Some(only.clone()),
            many => Some(best_candidate(prefix, many).clone()),
        }
    }

    /// Whether a file outside the index exists and defines `name`.
    fn defines_name(&self, rel: &Path, name: &str) -> bool {
        let full = self.root.join(rel);
        if !full.is_file() {
            return false;
        }
        let Ok(content) = std::fs::read_to_string(&full) else {
            return false;
        };
        let Ok(pattern) = definition_regex() else {
            return false;
        };
        definition_names(&pattern, &content).iter().any(|n| n == name)
    }
}

/// Among several files defining the same name, prefer the one whose module
/// path shares the most trailing components with the identifier's qualifying
/// prefix. Candidates are sorted, and only a strictly better score replaces
/// the current pick, so ties resolve to the alphabetically first path.
fn best_candidate<'c>(prefix: &str, candidates: &'c [PathBuf]) -> &'c PathBuf {
    let prefix_parts: Vec<&str> = prefix.split('.').filter(|p| !p.is_empty()).collect();

    let mut best = &candidates[0];
    let mut best_score = affinity(&prefix_parts, best);
    for candidate in &candidates[1..] {
        let score = affinity(&prefix_parts, candidate);
        if score > best_score {
            best = candidate;
            best_score = score;
        }
    }
    best
}

/// Number of trailing path components shared with the dotted prefix.
fn affinity(prefix_parts: &[&str], candidate: &Path) -> usize {
    let module = candidate.with_extension("");
    let module_parts: Vec<String> = module
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    let mut shared = 0;
    for (p, m) in prefix_parts.iter().rev().zip(module_parts.iter().rev()) {
        if *p != m.as_str() {
            break;
        }
        shared += 1;
    }
    shared
}

#[cfg(test)]
#[path = "locate_tests.rs"]
mod tests;
