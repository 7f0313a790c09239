// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! File classification for change records.
//!
//! Every changed path maps to exactly one [`FileKind`]; the selection engine
//! keys its policy off the (kind, change kind) pair. Classification is a pure
//! function of the path and the configured rules, with fixed priority:
//! special files win over test placement (a fixture hook inside `tests/` must
//! still force a full run), test placement wins over plain source.

use std::path::Path;

use crate::config::ClassifyConfig;

/// File classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Build, fixture, or data file whose change invalidates all recorded
    /// coverage (setup files, CI pipeline files, pickled data, ...).
    Special,
    /// Test code under a configured test prefix.
    Test,
    /// Production source code.
    Source,
    /// Anything else (docs, licenses, unknown formats). Never triggers tests.
    Other,
}

/// Classify a repo-relative path. First match wins:
/// special file/extension, then test prefix, then source extension, then other.
pub fn classify(path: &Path, rules: &ClassifyConfig) -> FileKind {
    if is_special(path, rules) {
        return FileKind::Special;
    }

    if has_extension_in(path, &rules.source_extensions) {
        if under_test_prefix(path, rules) {
            return FileKind::Test;
        }
        return FileKind::Source;
    }

    FileKind::Other
}

/// Whether the path lies under one of the configured test prefixes.
pub fn under_test_prefix(path: &Path, rules: &ClassifyConfig) -> bool {
    let text = path.to_string_lossy();
    rules.test_prefixes.iter().any(|prefix| {
        // "tests" must match "tests/..." but not "tests_helper.py"
        let stem = prefix.trim_end_matches('/');
        text.starts_with(stem) && text.len() > stem.len() && text.as_bytes()[stem.len()] == b'/'
    })
}

fn is_special(path: &Path, rules: &ClassifyConfig) -> bool {
    let text = path.to_string_lossy();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    // Match by file name so nested hook files (tests/conftest.py) are caught,
    // and by whole path so projects can pin a single file.
    if rules
        .special_files
        .iter()
        .any(|special| *special == name || *special == text)
    {
        return true;
    }

    has_extension_in(path, &rules.special_extensions)
}

fn has_extension_in(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let dotted = format!(".{}", ext.to_string_lossy());
    extensions.iter().any(|e| *e == dotted)
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
