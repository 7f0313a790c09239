pub mod classify;
pub mod cli;
pub mod cmd_init;
pub mod config;
pub mod coverage;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod git;
pub mod locate;
pub mod output;

pub use classify::{FileKind, classify};
pub use cli::{Cli, Command, InitArgs, OutputFormat, SelectArgs};
pub use config::{ClassifyConfig, Config};
pub use coverage::{ContextStore, CoverageIndex, SqliteStore};
pub use engine::{Decision, Selection};
pub use error::{Error, ExitCode, Result};
pub use git::{ChangeKind, ChangeRecord};
pub use locate::{DefinitionIndex, Locator};
