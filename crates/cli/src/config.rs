//! Configuration parsing and validation.
//!
//! Handles sift.toml parsing with version validation and unknown key warnings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Minimum config structure for version checking.
#[derive(Deserialize)]
struct VersionOnly {
    version: Option<i64>,
}

/// Config with flexible parsing that captures unknown keys.
#[derive(Deserialize)]
struct FlexibleConfig {
    #[allow(dead_code)]
    version: i64,

    #[serde(flatten)]
    tables: BTreeMap<String, toml::Value>,
}

/// Full configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Config file version (must be 1).
    pub version: i64,

    /// Project identification.
    #[serde(default)]
    pub project: ProjectConfig,

    /// Reference coverage store location.
    #[serde(default)]
    pub coverage: CoverageConfig,

    /// Change-set comparison settings.
    #[serde(default)]
    pub git: GitConfig,

    /// File classification rules.
    #[serde(default)]
    pub classify: ClassifyConfig,
}

/// Project-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    /// Project name; names the coverage store directory.
    pub name: Option<String>,
}

/// Coverage store configuration.
#[derive(Debug, Default, Deserialize)]
pub struct CoverageConfig {
    /// Directory holding per-project coverage stores.
    pub dir: Option<PathBuf>,

    /// Whether the reference build recorded line coverage instead of
    /// branch coverage.
    #[serde(default)]
    pub line_coverage: bool,
}

/// Git comparison configuration.
#[derive(Debug, Deserialize)]
pub struct GitConfig {
    /// Reference to diff against.
    #[serde(default = "GitConfig::default_base")]
    pub base: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            base: Self::default_base(),
        }
    }
}

impl GitConfig {
    fn default_base() -> String {
        "origin/master".to_string()
    }
}

/// File classification rules.
///
/// Extensions are matched with their leading dot; prefixes are matched
/// against repo-relative paths.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyConfig {
    /// File names (or exact relative paths) whose change always requires a
    /// full run.
    #[serde(default = "ClassifyConfig::default_special_files")]
    pub special_files: Vec<String>,

    /// Extensions whose change always requires a full run (data and build
    /// pipeline files).
    #[serde(default = "ClassifyConfig::default_special_extensions")]
    pub special_extensions: Vec<String>,

    /// Extensions recognized as source code.
    #[serde(default = "ClassifyConfig::default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Directory prefixes holding test code.
    #[serde(default = "ClassifyConfig::default_test_prefixes")]
    pub test_prefixes: Vec<String>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            special_files: Self::default_special_files(),
            special_extensions: Self::default_special_extensions(),
            source_extensions: Self::default_source_extensions(),
            test_prefixes: Self::default_test_prefixes(),
        }
    }
}

impl ClassifyConfig {
    fn default_special_files() -> Vec<String> {
        ["setup.py", "setup.cfg", "pyproject.toml", "Jenkinsfile", "conftest.py"]
            .map(String::from)
            .to_vec()
    }

    fn default_special_extensions() -> Vec<String> {
        [".pkl", ".h5", ".csv", ".gz", ".json", ".png", ".xml", ".p", ".groovy"]
            .map(String::from)
            .to_vec()
    }

    fn default_source_extensions() -> Vec<String> {
        vec![".py".to_string()]
    }

    fn default_test_prefixes() -> Vec<String> {
        vec!["tests/".to_string()]
    }
}

/// Currently supported config version.
pub const SUPPORTED_VERSION: i64 = 1;

/// Known top-level keys in the config.
const KNOWN_KEYS: &[&str] = &["version", "project", "coverage", "git", "classify"];

/// Load and validate config from a file path, warning on unknown keys.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse(&content, path)
}

/// Parse config from string content.
pub fn parse(content: &str, path: &Path) -> Result<Config> {
    // First check version
    let version_check: VersionOnly = toml::from_str(content).map_err(|e| Error::Config {
        message: e.to_string(),
        path: Some(path.to_path_buf()),
    })?;

    let version = version_check.version.ok_or_else(|| Error::Config {
        message: "missing required field: version".to_string(),
        path: Some(path.to_path_buf()),
    })?;

    if version != SUPPORTED_VERSION {
        return Err(Error::Config {
            message: format!(
                "unsupported config version {} (supported: {})",
                version, SUPPORTED_VERSION
            ),
            path: Some(path.to_path_buf()),
        });
    }

    // Warn about unknown top-level keys before the strict parse rejects
    // nothing (unknown tables are ignored, not fatal).
    let flexible: FlexibleConfig = toml::from_str(content).map_err(|e| Error::Config {
        message: e.to_string(),
        path: Some(path.to_path_buf()),
    })?;
    for key in flexible.tables.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn_unknown_key(path, key);
        }
    }

    toml::from_str(content).map_err(|e| Error::Config {
        message: e.to_string(),
        path: Some(path.to_path_buf()),
    })
}

fn warn_unknown_key(path: &Path, key: &str) {
    eprintln!(
        "sift: warning: {}: unrecognized table `{}` (ignored)",
        path.display(),
        key
    );
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
