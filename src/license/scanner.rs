use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::join_all;

use crate::models::LicenseType;

use super::classifier::{extract_license_info, extract_license_info_sync};

/// File names (lower-cased) that may carry a license declaration.
const TARGET_FILES: [&str; 6] = [
    "license.md",
    "license.rst",
    "license.txt",
    "license",
    "setup.cfg",
    "pyproject.toml",
];

/// Directory-name substrings pruned from the walk.
const EXCLUDE_DIRS: [&str; 11] = [
    "environment",
    "tests",
    "alembic",
    ".git",
    ".env",
    "venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".vscode",
    "coverage",
];

/// Recursive walker that collects candidate license-bearing files.
pub struct FileFinder {
    exclude: Vec<String>,
}

impl FileFinder {
    pub fn new() -> Self {
        Self {
            exclude: EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Extend the built-in prune list with extra substrings.
    pub fn with_excludes(extra: &[String]) -> Self {
        let mut finder = Self::new();
        finder.exclude.extend(extra.iter().cloned());
        finder
    }

    /// Walk `root` depth-first, pruning excluded directories, and collect
    /// target files. Entries are visited in name order so results are
    /// deterministic.
    pub fn find_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        self.walk(root, &mut found);
        found
    }

    fn walk(&self, dir: &Path, found: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("cannot read directory {}: {}", dir.display(), err);
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                if !self.should_exclude(&path) {
                    self.walk(&path, found);
                }
            } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if TARGET_FILES.contains(&name.to_lowercase().as_str()) {
                    found.push(path);
                }
            }
        }
    }

    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|ex| path_str.contains(ex.as_str()))
    }
}

impl Default for FileFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies extraction + classification over the files a [`FileFinder`]
/// discovers.
///
/// All four retrieval modes share one failure policy: a file whose
/// extraction fails is logged and contributes nothing; every successful
/// extraction (including `None` and `Unknown`) is reported.
pub struct LicenseFinder {
    file_finder: FileFinder,
}

impl LicenseFinder {
    pub fn new(file_finder: FileFinder) -> Self {
        Self { file_finder }
    }

    /// Classify every candidate file, sequentially.
    pub fn find_all(&self, root: &Path) -> HashMap<PathBuf, LicenseType> {
        let mut results = HashMap::new();
        for path in self.file_finder.find_files(root) {
            match extract_license_info_sync(&path) {
                Ok(info) => {
                    results.insert(path, info);
                }
                Err(err) => log::warn!("error reading {}: {}", path.display(), err),
            }
        }
        results
    }

    /// First successful classification in discovery order; `None` when no
    /// candidate file yields one.
    pub fn find_first(&self, root: &Path) -> LicenseType {
        for path in self.file_finder.find_files(root) {
            match extract_license_info_sync(&path) {
                Ok(info) => return info,
                Err(err) => log::warn!("error reading {}: {}", path.display(), err),
            }
        }
        LicenseType::None
    }

    /// Classify every candidate file, fanning out one read+classify task
    /// per file and gathering on completion.
    pub async fn find_all_async(&self, root: &Path) -> HashMap<PathBuf, LicenseType> {
        let found = self.file_finder.find_files(root);
        let tasks = found.iter().map(|path| extract_license_info(path));
        let outcomes = join_all(tasks).await;

        let mut results = HashMap::new();
        for (path, outcome) in found.into_iter().zip(outcomes) {
            match outcome {
                Ok(info) => {
                    results.insert(path, info);
                }
                Err(err) => log::error!("error processing {}: {}", path.display(), err),
            }
        }
        results
    }

    /// Like [`LicenseFinder::find_first`] but suspending on each file read
    /// instead of blocking. Files are awaited in discovery order; siblings
    /// are not raced, so no cancellation is needed.
    pub async fn find_first_async(&self, root: &Path) -> LicenseType {
        for path in self.file_finder.find_files(root) {
            match extract_license_info(&path).await {
                Ok(info) => return info,
                Err(err) => log::warn!("error reading {}: {}", path.display(), err),
            }
        }
        LicenseType::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LGPL_TEXT: &str = "This software is licensed under the **Lesser \
        General Public License (LGPL v3.0)**, meaning you are free to use, \
        modify, and distribute this tool, provided that:";

    fn project_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("license.md"), LGPL_TEXT).unwrap();
        std::fs::write(
            dir.path().join("setup.cfg"),
            "[metadata]\nname = example\nlicense = MIT License\n",
        )
        .unwrap();

        // A license inside an excluded subtree must never be seen.
        let git = dir.path().join(".git");
        std::fs::create_dir(&git).unwrap();
        std::fs::write(git.join("LICENSE"), "Apache License 2.0").unwrap();

        let sub = dir.path().join("pkg");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("pyproject.toml"), "[tool.poetry]\nname = \"pkg\"\n")
            .unwrap();

        dir
    }

    #[test]
    fn test_find_files_skips_excluded_directories() {
        let dir = project_tree();
        let files = FileFinder::new().find_files(dir.path());

        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| !p.to_string_lossy().contains(".git")));
    }

    #[test]
    fn test_find_all_classifies_each_target() {
        let dir = project_tree();
        let finder = LicenseFinder::new(FileFinder::new());
        let results = finder.find_all(dir.path());

        assert_eq!(
            results.get(&dir.path().join("license.md")),
            Some(&LicenseType::Lgpl)
        );
        assert_eq!(
            results.get(&dir.path().join("setup.cfg")),
            Some(&LicenseType::Mit)
        );
        // Manifest present but declaring nothing: distinct terminal state.
        assert_eq!(
            results.get(&dir.path().join("pkg").join("pyproject.toml")),
            Some(&LicenseType::None)
        );
    }

    #[test]
    fn test_find_first_returns_first_classification() {
        let dir = project_tree();
        let finder = LicenseFinder::new(FileFinder::new());
        // Name order puts license.md first.
        assert_eq!(finder.find_first(dir.path()), LicenseType::Lgpl);
    }

    #[test]
    fn test_find_first_on_empty_tree_is_none() {
        let dir = TempDir::new().unwrap();
        let finder = LicenseFinder::new(FileFinder::new());
        assert_eq!(finder.find_first(dir.path()), LicenseType::None);
    }

    #[tokio::test]
    async fn test_find_all_async_matches_sequential() {
        let dir = project_tree();
        let finder = LicenseFinder::new(FileFinder::new());
        assert_eq!(finder.find_all_async(dir.path()).await, finder.find_all(dir.path()));
    }

    #[tokio::test]
    async fn test_find_first_async() {
        let dir = project_tree();
        let finder = LicenseFinder::new(FileFinder::new());
        assert_eq!(finder.find_first_async(dir.path()).await, LicenseType::Lgpl);
    }

    #[test]
    fn test_extra_excludes_are_honored() {
        let dir = project_tree();
        let finder = FileFinder::with_excludes(&["pkg".to_string()]);
        let files = finder.find_files(dir.path());
        assert!(files.iter().all(|p| !p.to_string_lossy().contains("pkg")));
    }
}
