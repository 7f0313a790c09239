// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Implementation of the `sift init` command.

use anyhow::Result;

use crate::cli::InitArgs;
use crate::error::ExitCode;

/// Starter configuration written by `sift init`.
const DEFAULT_TEMPLATE: &str = r#"version = 1

[project]
# Names the coverage store directory: <coverage.dir>/<name>/<build>/.coverage
# name = "myproject"

[coverage]
# Directory the reference build publishes coverage stores to.
# dir = "/srv/coverage"
# The reference build recorded line coverage instead of branch coverage.
# line_coverage = false

[git]
# Reference to diff against.
base = "origin/master"

[classify]
# Files and extensions whose change always requires a full run, code
# extensions, and test directory prefixes. Defaults shown.
# special_files = ["setup.py", "setup.cfg", "pyproject.toml", "Jenkinsfile", "conftest.py"]
# special_extensions = [".pkl", ".h5", ".csv", ".gz", ".json", ".png", ".xml", ".p", ".groovy"]
# source_extensions = [".py"]
# test_prefixes = ["tests/"]
"#;

/// Run the `init` command to create a sift.toml configuration file.
pub fn run(args: &InitArgs) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    run_in(&cwd, args)
}

fn run_in(dir: &std::path::Path, args: &InitArgs) -> Result<ExitCode> {
    let config_path = dir.join("sift.toml");

    if config_path.exists() && !args.force {
        eprintln!("sift.toml already exists. Use --force to overwrite.");
        return Ok(ExitCode::ConfigError);
    }

    std::fs::write(&config_path, DEFAULT_TEMPLATE)?;

    println!("Created sift.toml");
    Ok(ExitCode::Success)
}

#[cfg(test)]
#[path = "cmd_init_tests.rs"]
mod tests;
