#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;

use tempfile::tempdir;

use super::*;

#[test]
fn finds_config_in_start_dir() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("sift.toml"), "version = 1\n").unwrap();

    let found = find_config(dir.path());
    assert_eq!(found, Some(dir.path().join("sift.toml")));
}

#[test]
fn finds_config_in_parent_dir() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("sift.toml"), "version = 1\n").unwrap();
    let nested = dir.path().join("a/b");
    fs::create_dir_all(&nested).unwrap();

    let found = find_config(&nested);
    assert_eq!(found, Some(dir.path().join("sift.toml")));
}

#[test]
fn stops_at_git_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("sift.toml"), "version = 1\n").unwrap();
    let repo = dir.path().join("repo");
    fs::create_dir_all(repo.join(".git")).unwrap();
    let nested = repo.join("src");
    fs::create_dir_all(&nested).unwrap();

    // The config above the repo root must not leak in.
    assert_eq!(find_config(&nested), None);
}

#[test]
fn resolve_prefers_explicit_path() {
    let dir = tempdir().unwrap();
    let explicit = dir.path().join("custom.toml");
    fs::write(&explicit, "version = 1\n").unwrap();

    let resolved = resolve_config(Some(&explicit), dir.path()).unwrap();
    assert_eq!(resolved, Some(explicit));
}

#[test]
fn resolve_fails_on_missing_explicit_path() {
    let dir = tempdir().unwrap();
    let explicit = dir.path().join("missing.toml");

    let result = resolve_config(Some(&explicit), dir.path());
    assert!(result.is_err());
}

#[test]
fn resolve_falls_back_to_discovery() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".git")).unwrap();

    let resolved = resolve_config(None, dir.path()).unwrap();
    assert_eq!(resolved, None);
}
