use std::path::PathBuf;

/// Sift error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found or invalid
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid command-line arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// File I/O error
    #[error("io error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No change set could be produced (not a repository, or the base
    /// reference does not resolve). Fatal: there is nothing to select against.
    #[error("diff unavailable: {message}")]
    DiffUnavailable { message: String },

    /// The coverage store for the requested project is missing or unreadable.
    /// Fatal for partial selection; the caller should fall back to a full run.
    #[error("coverage index unavailable: {}: {message}", .path.display())]
    IndexUnavailable { path: PathBuf, message: String },

    /// A recorded test context could not be resolved to a test file.
    /// Recoverable: the engine excludes the context and continues.
    #[error("unresolved test context: {0}")]
    UnresolvedContext(String),

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type using sift Error
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes per CLI spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// A decision was produced (including a full-run decision)
    Success = 0,
    /// The diff or the coverage store was unavailable; run the full suite
    Unavailable = 1,
    /// Configuration or argument error
    ConfigError = 2,
    /// Internal error
    InternalError = 3,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. } | Error::Argument(_) => ExitCode::ConfigError,
            Error::DiffUnavailable { .. } | Error::IndexUnavailable { .. } => ExitCode::Unavailable,
            Error::Io { .. } => ExitCode::InternalError,
            // Unresolved contexts are handled inline by the engine; one
            // reaching main means a call site failed to recover.
            Error::UnresolvedContext(_) => ExitCode::InternalError,
            Error::Internal(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
