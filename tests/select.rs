// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests for `sift select`, driving the built binary against real
//! git repositories and coverage stores.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn git(repo: &Path, args: &[&str]) {
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("git command failed to spawn");
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A committed project: one source module, one test file, docs, setup.cfg.
fn setup_repo() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    git(root, &["init"]);
    git(root, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    git(root, &["config", "user.email", "test@example.com"]);
    git(root, &["config", "user.name", "Test User"]);

    write(root, "code1.py", "def one():\n    return 1\n");
    write(
        root,
        "tests/test_code1.py",
        "def test_code1():\n    assert True\n\n\ndef test_code2():\n    assert True\n",
    );
    write(root, "README.md", "# Project\n");
    write(root, "setup.cfg", "[metadata]\nname = proj\n");

    git(root, &["add", "."]);
    git(root, &["commit", "-m", "chore: initial commit"]);

    temp
}

/// Publish a reference coverage store at <repo>/coverage/proj/1/.coverage.
fn write_coverage(root: &Path, pairs: &[(&str, &str)]) {
    let build = root.join("coverage/proj/1");
    std::fs::create_dir_all(&build).unwrap();

    let conn = rusqlite::Connection::open(build.join(".coverage")).unwrap();
    conn.execute_batch(
        "CREATE TABLE file (id INTEGER PRIMARY KEY, path TEXT UNIQUE);
         CREATE TABLE context (id INTEGER PRIMARY KEY, context TEXT UNIQUE);
         CREATE TABLE arc (file_id INTEGER, context_id INTEGER, fromno INTEGER, tono INTEGER);
         CREATE TABLE line_bits (file_id INTEGER, context_id INTEGER, numbits BLOB);",
    )
    .unwrap();
    for (file, context) in pairs {
        conn.execute(
            "INSERT OR IGNORE INTO file (path) VALUES (?1)",
            rusqlite::params![file],
        )
        .unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO context (context) VALUES (?1)",
            rusqlite::params![context],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO arc (file_id, context_id, fromno, tono) \
             SELECT file.id, context.id, 1, 2 FROM file, context \
             WHERE file.path = ?1 AND context.context = ?2",
            rusqlite::params![file, context],
        )
        .unwrap();
    }
}

fn default_coverage(root: &Path) {
    write_coverage(
        root,
        &[
            ("/build/proj/code1.py", "tests.test_code1.test_code1"),
            ("/build/proj/code1.py", "tests.test_code1.test_code2"),
        ],
    );
}

fn sift_select(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sift").unwrap();
    cmd.current_dir(root).args([
        "select",
        "--project",
        "proj",
        "--coverage-dir",
        "coverage",
        "--base",
        "master",
    ]);
    cmd
}

fn test_list(root: &Path) -> Option<String> {
    std::fs::read_to_string(root.join("test_files_to_run.txt")).ok()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn modified_source_selects_its_tests() {
    let repo = setup_repo();
    default_coverage(repo.path());

    write(repo.path(), "code1.py", "def one():\n    return 2\n");

    sift_select(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("tests/test_code1.py"));

    assert_eq!(
        test_list(repo.path()).as_deref(),
        Some("tests/test_code1.py\n")
    );
}

#[test]
fn modified_setup_cfg_requires_full_run() {
    let repo = setup_repo();
    default_coverage(repo.path());

    write(repo.path(), "setup.cfg", "[metadata]\nname = proj2\n");

    sift_select(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("full test run required"));

    // Absence of the list file is the full-run signal to the runner
    assert!(test_list(repo.path()).is_none());
}

#[test]
fn added_source_file_requires_full_run() {
    let repo = setup_repo();
    default_coverage(repo.path());

    write(repo.path(), "newmod.py", "def two():\n    return 2\n");

    sift_select(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("full test run required"));
}

#[test]
fn added_test_file_selects_itself() {
    let repo = setup_repo();
    default_coverage(repo.path());

    write(
        repo.path(),
        "tests/test_new.py",
        "def test_a():\n    assert True\n",
    );

    sift_select(repo.path()).assert().success();

    assert_eq!(
        test_list(repo.path()).as_deref(),
        Some("tests/test_new.py\n")
    );
}

#[test]
fn docs_change_requires_no_tests() {
    let repo = setup_repo();
    default_coverage(repo.path());

    write(repo.path(), "README.md", "# Project v2\n");

    sift_select(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no tests required"));

    assert_eq!(test_list(repo.path()).as_deref(), Some(""));
}

#[test]
fn json_format_is_machine_readable() {
    let repo = setup_repo();
    default_coverage(repo.path());

    write(repo.path(), "code1.py", "def one():\n    return 2\n");

    let output = sift_select(repo.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["decision"], "run-specific");
    assert_eq!(value["tests"][0], "tests/test_code1.py");
}

#[test]
fn unresolved_contexts_warn_but_do_not_fail() {
    let repo = setup_repo();
    write_coverage(
        repo.path(),
        &[("/build/proj/code1.py", "tests.test_gone.test_vanished")],
    );

    write(repo.path(), "code1.py", "def one():\n    return 2\n");

    sift_select(repo.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("tests.test_gone.test_vanished"));

    assert_eq!(test_list(repo.path()).as_deref(), Some(""));
}

#[test]
fn config_file_supplies_project_and_coverage_dir() {
    let repo = setup_repo();
    default_coverage(repo.path());

    write(
        repo.path(),
        "sift.toml",
        "version = 1\n\n[project]\nname = \"proj\"\n\n[coverage]\ndir = \"coverage\"\n\n[git]\nbase = \"master\"\n",
    );
    write(repo.path(), "code1.py", "def one():\n    return 2\n");

    Command::cargo_bin("sift")
        .unwrap()
        .current_dir(repo.path())
        .arg("select")
        .assert()
        .success()
        .stdout(predicate::str::contains("tests/test_code1.py"));
}

// =============================================================================
// FAILURE MODES
// =============================================================================

#[test]
fn missing_coverage_store_is_fatal() {
    let repo = setup_repo();

    write(repo.path(), "code1.py", "def one():\n    return 2\n");

    sift_select(repo.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("coverage index unavailable"))
        .stderr(predicate::str::contains("run the full test suite"));

    assert!(test_list(repo.path()).is_none());
}

#[test]
fn missing_project_name_is_a_config_error() {
    let repo = setup_repo();
    default_coverage(repo.path());

    Command::cargo_bin("sift")
        .unwrap()
        .current_dir(repo.path())
        .args(["select", "--coverage-dir", "coverage", "--base", "master"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no project name"));
}

#[test]
fn outside_a_repository_is_fatal() {
    let temp = TempDir::new().unwrap();
    default_coverage(temp.path());

    sift_select(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("diff unavailable"));
}
