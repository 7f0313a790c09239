// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Select command implementation.
//!
//! Orchestrates the pipeline: config → change set → coverage index →
//! definition index → selection engine → result sink.

use std::path::PathBuf;

use sift::cli::{Cli, OutputFormat, SelectArgs};
use sift::config::{self, Config};
use sift::coverage::{CoverageIndex, SqliteStore, resolve_store_path};
use sift::discovery;
use sift::engine;
use sift::error::{Error, ExitCode};
use sift::git;
use sift::locate::Locator;
use sift::output;

/// Run the select command.
pub fn run(cli: &Cli, args: &SelectArgs) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;

    // Determine root directory
    let root = match &args.path {
        None => cwd.clone(),
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => cwd.join(path),
    };

    // Resolve config from root directory
    let config_path = discovery::resolve_config(cli.config.as_deref(), &root)?;
    let config = match &config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            config::load(path)?
        }
        None => {
            tracing::debug!("no config found, using defaults");
            Config::default()
        }
    };

    // CLI flags override config values
    let project = args
        .project
        .clone()
        .or_else(|| config.project.name.clone())
        .ok_or_else(|| {
            Error::Argument(
                "no project name; pass --project or set [project] name in sift.toml".to_string(),
            )
        })?;
    let coverage_dir = args
        .coverage_dir
        .clone()
        .or_else(|| config.coverage.dir.clone())
        .ok_or_else(|| {
            Error::Argument(
                "no coverage directory; pass --coverage-dir or set [coverage] dir in sift.toml"
                    .to_string(),
            )
        })?;
    let base = args.base.clone().unwrap_or_else(|| config.git.base.clone());
    let line_coverage = args.line_coverage || config.coverage.line_coverage;
    let rules = config.classify;

    // Change set
    let changes = if args.committed {
        git::changed_in_commits(&root, &base)?
    } else {
        git::changed_in_worktree(&root, &base)?
    };
    tracing::info!(base = %base, changes = changes.len(), "extracted change set");

    // Coverage index: one immutable snapshot for the whole run
    let store_path = resolve_store_path(&coverage_dir, &project, args.build.as_deref())?;
    let store = SqliteStore::open(&store_path, line_coverage)?;
    let index = CoverageIndex::from_store(&store)?;
    tracing::debug!(files = index.file_count(), "loaded coverage index");

    // Definition index over the test tree, built once
    let mut locator = Locator::new(&root, &rules)?;

    let selection = engine::select(&changes, &rules, &index, &mut locator);

    for context in &selection.unresolved {
        eprintln!(
            "sift: warning: could not locate test context '{}'; excluding it",
            context
        );
    }

    // The runner reads the list file; absence signals a full run.
    let output_path: PathBuf = if args.output.is_absolute() {
        args.output.clone()
    } else {
        root.join(&args.output)
    };
    output::write_test_list(&output_path, &selection)?;

    match args.format {
        OutputFormat::Text => print!("{}", output::render_text(&selection)),
        OutputFormat::Json => println!("{}", output::render_json(&selection)?),
    }

    Ok(ExitCode::Success)
}
