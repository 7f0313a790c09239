// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Selects the minimal set of test files to re-run for a change, using
/// recorded coverage data
#[derive(Parser)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "SIFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Select the test files affected by the current change set
    Select(SelectArgs),
    /// Initialize sift configuration
    Init(InitArgs),
}

#[derive(clap::Args)]
pub struct SelectArgs {
    /// Repository root to select in (default: current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Project name; locates coverage data under <coverage-dir>/<name>
    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,

    /// Directory holding per-project reference coverage stores
    #[arg(long, value_name = "DIR")]
    pub coverage_dir: Option<PathBuf>,

    /// Build number to read coverage from (default: most recent build)
    #[arg(long, value_name = "N")]
    pub build: Option<String>,

    /// Git reference to compare against (e.g., origin/master)
    #[arg(long, value_name = "REF")]
    pub base: Option<String>,

    /// Diff committed changes only (merge-base..HEAD), for CI; default
    /// compares the working tree against the base reference
    #[arg(long)]
    pub committed: bool,

    /// The reference build recorded line coverage rather than branch coverage
    #[arg(long)]
    pub line_coverage: bool,

    /// File to write the selected test list to (not written on a full-run
    /// decision)
    #[arg(long, default_value = "test_files_to_run.txt", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(clap::Args)]
pub struct InitArgs {
    /// Overwrite existing config
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
