use std::collections::HashSet;
use std::path::Path;

use super::{DependencyReader, ReaderError, WILDCARD};

/// Reader for plain-text `requirements.txt` manifests.
///
/// One dependency per line, either `name==version` or a bare `name` (kept
/// with a wildcard version). Blank lines and `#` comments are skipped.
pub struct RequirementsReader;

impl DependencyReader for RequirementsReader {
    fn read_dependencies(&self, path: &Path) -> Result<HashSet<String>, ReaderError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ReaderError::from_io(path, e))?;

        let mut dependencies = HashSet::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, version) = match line.split_once("==") {
                Some((name, version)) => (name.trim(), version.trim()),
                None => (line, WILDCARD),
            };
            dependencies.insert(format!("{}={}", name, version));
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
    fn test_pinned_and_bare_names() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "requests==2.25.1\n# comment\nnumpy\n").unwrap();

        let deps = RequirementsReader.read_dependencies(f.path()).unwrap();
        let expected: HashSet<String> = ["requests=2.25.1", "numpy=*"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(deps, expected);
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "\n  pandas == 1.3.3  \n\n   \nscipy==1.7.1\n").unwrap();

        let deps = RequirementsReader.read_dependencies(f.path()).unwrap();
        assert!(deps.contains("pandas=1.3.3"));
        assert!(deps.contains("scipy=1.7.1"));
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = RequirementsReader
            .read_dependencies(Path::new("/nonexistent/requirements.txt"))
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound(_)));
    }
}
