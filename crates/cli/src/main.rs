// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sift CLI entry point.

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt};

use sift::cli::{Cli, Command};
use sift::error::ExitCode;

mod cmd_select;

fn init_logging() {
    let filter = EnvFilter::try_from_env("SIFT_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("sift: {}", e);
            let code = match e.downcast_ref::<sift::Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::InternalError,
            };
            if code == ExitCode::Unavailable {
                eprintln!("sift: no trustworthy selection possible; run the full test suite");
            }
            code
        }
    };

    std::process::exit(exit_code as i32);
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match &cli.command {
        None => {
            // Show help for bare invocation
            Cli::command().print_help()?;
            println!();
            Ok(ExitCode::Success)
        }
        Some(Command::Select(args)) => cmd_select::run(&cli, args),
        Some(Command::Init(args)) => sift::cmd_init::run(args),
    }
}
