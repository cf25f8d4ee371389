use std::collections::HashSet;
use std::path::Path;

use super::{declared_version, DependencyReader, ReaderError};

/// Reader for poetry-managed `pyproject.toml` manifests.
///
/// Collects `[tool.poetry.dependencies]` plus every
/// `[tool.poetry.group.<name>.dependencies]` table. The interpreter
/// constraint (`python = "^3.x"`) is emitted like any other entry; the
/// resolver filters it out.
pub struct PyprojectReader;

impl DependencyReader for PyprojectReader {
    fn read_dependencies(&self, path: &Path) -> Result<HashSet<String>, ReaderError> {
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            return Err(ReaderError::Format(path.display().to_string()));
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ReaderError::from_io(path, e))?;
        let pyproject: toml::Value = content.parse().map_err(|e: toml::de::Error| {
            ReaderError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let poetry = pyproject.get("tool").and_then(|t| t.get("poetry"));

        let mut deps = HashSet::new();
        collect_table(poetry.and_then(|p| p.get("dependencies")), &mut deps);

        if let Some(groups) = poetry
            .and_then(|p| p.get("group"))
            .and_then(|g| g.as_table())
        {
            for group in groups.values() {
                collect_table(group.get("dependencies"), &mut deps);
            }
        }

        Ok(deps)
    }
}

fn collect_table(table: Option<&toml::Value>, deps: &mut HashSet<String>) {
    if let Some(entries) = table.and_then(|t| t.as_table()) {
        for (name, value) in entries {
            deps.insert(format!("{}={}", name, declared_version(value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_main_and_group_dependencies() {
        let mut f = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            f,
            r#"
[tool.poetry.dependencies]
python = "^3.8"
requests = "^2.25.1"
scipy = {{ version = "==1.7.1", markers = "python_version >= '3.6'" }}

[tool.poetry.group.dev.dependencies]
pytest = "^7.0"

[tool.poetry.group.docs.dependencies]
sphinx = "*"
"#
        )
        .unwrap();

        let deps = PyprojectReader.read_dependencies(f.path()).unwrap();
        let expected: HashSet<String> = [
            "python=^3.8",
            "requests=^2.25.1",
            "scipy=1.7.1",
            "pytest=^7.0",
            "sphinx=*",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(deps, expected);
    }

    #[test]
    fn test_wrong_extension_is_format_error() {
        let err = PyprojectReader
            .read_dependencies(Path::new("pyproject.cfg"))
            .unwrap_err();
        assert!(matches!(err, ReaderError::Format(_)));
    }

    #[test]
    fn test_missing_file_is_propagated() {
        let err = PyprojectReader
            .read_dependencies(Path::new("/nonexistent/pyproject.toml"))
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound(_)));
    }
}
