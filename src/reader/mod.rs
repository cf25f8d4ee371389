//! Manifest parsers that turn a dependency manifest into a normalized set of
//! `"name=version"` strings.
//!
//! Each format implements [`DependencyReader`]; [`DependencyFileReader`] holds
//! one implementation as a swappable strategy. A missing version is always
//! represented with the wildcard `*` rather than dropped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod pipfile;
pub mod pyproject;
pub mod requirements;

pub use pipfile::PipfileReader;
pub use pyproject::PyprojectReader;
pub use requirements::RequirementsReader;

/// Version marker for dependencies declared without a pinned version.
pub const WILDCARD: &str = "*";

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("manifest not found: {0}")]
    NotFound(PathBuf),
    #[error("unsupported manifest format: {0}")]
    Format(String),
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReaderError {
    /// Map an I/O error, distinguishing a missing manifest from other
    /// read failures.
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ReaderError::NotFound(path.to_path_buf())
        } else {
            ReaderError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

pub trait DependencyReader {
    fn read_dependencies(&self, path: &Path) -> Result<HashSet<String>, ReaderError>;
}

/// Strategy holder over a [`DependencyReader`] implementation.
pub struct DependencyFileReader {
    strategy: Box<dyn DependencyReader>,
}

impl DependencyFileReader {
    pub fn new(strategy: Box<dyn DependencyReader>) -> Self {
        Self { strategy }
    }

    /// Swap the parser implementation at runtime.
    pub fn set_strategy(&mut self, strategy: Box<dyn DependencyReader>) {
        self.strategy = strategy;
    }

    pub fn list_dependencies(&self, path: &Path) -> Result<HashSet<String>, ReaderError> {
        self.strategy.read_dependencies(path)
    }
}

/// Apply the shared nested-value rule to one dependency entry: a plain
/// string is used as-is, a table contributes its `version` field (wildcard
/// when absent), and leading `=` characters are stripped from the result.
pub(crate) fn declared_version(value: &toml::Value) -> String {
    let raw = match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(table) => table
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or(WILDCARD)
            .to_string(),
        other => other.to_string(),
    };
    raw.trim_start_matches('=').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_declared_version_nested_table() {
        let value: toml::Value = "version = \"==1.7.1\"".parse().unwrap();
        assert_eq!(declared_version(&value), "1.7.1");
    }

    #[test]
    fn test_declared_version_table_without_version_key() {
        let value: toml::Value = "markers = \"python_version >= '3.6'\"".parse().unwrap();
        assert_eq!(declared_version(&value), "*");
    }

    #[test]
    fn test_declared_version_plain_string() {
        let value = toml::Value::String("^2.25.1".to_string());
        assert_eq!(declared_version(&value), "^2.25.1");
    }

    #[test]
    fn test_set_strategy_swaps_parser() {
        let mut req = NamedTempFile::new().unwrap();
        writeln!(req, "requests==2.25.1").unwrap();

        let mut pip = NamedTempFile::new().unwrap();
        writeln!(pip, "[packages]\nnumpy = \"==1.21.0\"").unwrap();

        let mut reader = DependencyFileReader::new(Box::new(RequirementsReader));
        let deps = reader.list_dependencies(req.path()).unwrap();
        assert!(deps.contains("requests=2.25.1"));

        reader.set_strategy(Box::new(PipfileReader));
        let deps = reader.list_dependencies(pip.path()).unwrap();
        assert!(deps.contains("numpy=1.21.0"));
    }
}
