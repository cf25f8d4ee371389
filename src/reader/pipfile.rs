use std::collections::HashSet;
use std::path::Path;

use super::{declared_version, DependencyReader, ReaderError};

/// Reader for `Pipfile` manifests.
///
/// Collects the `[packages]` and `[dev-packages]` tables. Entries may be a
/// plain version string or a nested table carrying `version` plus extras
/// such as environment markers.
pub struct PipfileReader;

const SECTIONS: [&str; 2] = ["packages", "dev-packages"];

impl DependencyReader for PipfileReader {
    fn read_dependencies(&self, path: &Path) -> Result<HashSet<String>, ReaderError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ReaderError::from_io(path, e))?;
        let pipfile: toml::Value = content.parse().map_err(|e: toml::de::Error| {
            ReaderError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let mut dependencies = HashSet::new();
        for section in SECTIONS {
            if let Some(packages) = pipfile.get(section).and_then(|s| s.as_table()) {
                for (name, value) in packages {
                    dependencies.insert(format!("{}={}", name, declared_version(value)));
                }
            }
        }
        Ok(dependencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_packages_and_dev_packages() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"
[packages]
requests = "*"
numpy = "==1.21.0"
pandas = {{ version = "*", markers = "python_version >= '3.6'" }}
scipy = {{ version = "==1.7.1", markers = "python_version >= '3.6'" }}

[dev-packages]
pytest = "==7.0.0"
"#
        )
        .unwrap();

        let deps = PipfileReader.read_dependencies(f.path()).unwrap();
        let expected: HashSet<String> = [
            "requests=*",
            "numpy=1.21.0",
            "pandas=*",
            "scipy=1.7.1",
            "pytest=7.0.0",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(deps, expected);
    }

    #[test]
    fn test_nested_table_without_version_defaults_to_wildcard() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            "[packages]\nflask = {{ markers = \"python_version >= '3.8'\" }}\n"
        )
        .unwrap();

        let deps = PipfileReader.read_dependencies(f.path()).unwrap();
        assert!(deps.contains("flask=*"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = PipfileReader
            .read_dependencies(Path::new("/nonexistent/Pipfile"))
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound(_)));
    }
}
