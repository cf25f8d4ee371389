use std::path::{Path, PathBuf};

/// Metadata parsed from one installed distribution's `.dist-info` directory.
#[derive(Debug, Default)]
pub struct InstalledPackage {
    pub name: Option<String>,
    pub version: Option<String>,
    pub homepage: Option<String>,
    pub author: Option<String>,
    pub maintainer: Option<String>,
    pub author_email: Option<String>,
    pub maintainer_email: Option<String>,
    pub license_field: Option<String>,
    pub classifiers: Vec<String>,
    /// Sum of installed file sizes from RECORD; 0 when RECORD is unavailable.
    pub size: i64,
}

/// Lookup over the host package manager's installed-distribution metadata
/// (`site-packages/<name>-<version>.dist-info`).
pub struct LocalStore {
    site_packages: Vec<PathBuf>,
}

impl LocalStore {
    /// Probe the usual virtual-environment locations under `project`, plus
    /// `$VIRTUAL_ENV` when set.
    pub fn discover(project: &Path) -> Self {
        let mut roots: Vec<PathBuf> = Vec::new();
        if let Ok(active) = std::env::var("VIRTUAL_ENV") {
            roots.push(PathBuf::from(active));
        }
        for env_dir in ["venv", ".venv", "env"] {
            roots.push(project.join(env_dir));
        }

        let mut site_packages = Vec::new();
        for root in roots {
            // POSIX layout: <env>/lib/python3.x/site-packages
            let lib = root.join("lib");
            if let Ok(entries) = std::fs::read_dir(&lib) {
                for entry in entries.flatten() {
                    let candidate = entry.path().join("site-packages");
                    if candidate.is_dir() {
                        site_packages.push(candidate);
                    }
                }
            }
            // Windows layout: <env>/Lib/site-packages
            let win = root.join("Lib").join("site-packages");
            if win.is_dir() {
                site_packages.push(win);
            }
        }

        Self { site_packages }
    }

    /// Build a store over explicit site-packages directories.
    pub fn with_paths(site_packages: Vec<PathBuf>) -> Self {
        Self { site_packages }
    }

    /// Find the installed distribution for `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<InstalledPackage> {
        let wanted = normalize_name(name);
        for dir in &self.site_packages {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                let dir_name = match file_name.to_str() {
                    Some(n) => n,
                    None => continue,
                };
                let Some(stem) = dir_name.strip_suffix(".dist-info") else {
                    continue;
                };
                // Stem is "<distname>-<version>"; the version never
                // contains '-', so split on the last one.
                let Some((dist_name, _version)) = stem.rsplit_once('-') else {
                    continue;
                };
                if normalize_name(dist_name) != wanted {
                    continue;
                }
                let metadata = std::fs::read_to_string(entry.path().join("METADATA")).ok()?;
                let mut pkg = parse_metadata(&metadata);
                pkg.size = record_size(&entry.path().join("RECORD"));
                return Some(pkg);
            }
        }
        None
    }
}

/// Case- and separator-insensitive package name comparison key (PEP 503).
fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '.' { '-' } else { c })
        .collect()
}

/// Parse the RFC-822 style header block of a METADATA file.
pub(crate) fn parse_metadata(content: &str) -> InstalledPackage {
    let mut pkg = InstalledPackage::default();
    for line in content.lines() {
        // Headers end at the first blank line; the long description follows.
        if line.trim().is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "Name" => pkg.name = Some(value.to_string()),
            "Version" => pkg.version = Some(value.to_string()),
            "Home-page" => pkg.homepage = Some(value.to_string()),
            "Author" => pkg.author = Some(value.to_string()),
            "Maintainer" => pkg.maintainer = Some(value.to_string()),
            "Author-email" => pkg.author_email = Some(value.to_string()),
            "Maintainer-email" => pkg.maintainer_email = Some(value.to_string()),
            "License" => pkg.license_field = Some(value.to_string()),
            "Classifier" => pkg.classifiers.push(value.to_string()),
            _ => {}
        }
    }
    pkg
}

/// Sum the size column of a RECORD file (`path,hash,size` per line).
fn record_size(path: &Path) -> i64 {
    let Ok(content) = std::fs::read_to_string(path) else {
        return 0;
    };
    content
        .lines()
        .filter_map(|line| line.rsplit(',').next())
        .filter_map(|size| size.trim().parse::<i64>().ok())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const METADATA: &str = "\
Metadata-Version: 2.1
Name: requests
Version: 2.25.1
Home-page: https://requests.readthedocs.io
Author: Kenneth Reitz
Author-email: me@kennethreitz.org
License: Apache 2.0
Classifier: License :: OSI Approved :: Apache Software License
Classifier: Programming Language :: Python :: 3

Requests is an HTTP library.
License: this line is body text, not a header.
";

    fn fake_site_packages(dir: &TempDir) -> PathBuf {
        let site = dir.path().join("site-packages");
        let dist_info = site.join("requests-2.25.1.dist-info");
        std::fs::create_dir_all(&dist_info).unwrap();
        std::fs::write(dist_info.join("METADATA"), METADATA).unwrap();
        std::fs::write(
            dist_info.join("RECORD"),
            "requests/__init__.py,sha256=abc,120\nrequests/api.py,sha256=def,880\n",
        )
        .unwrap();
        site
    }

    #[test]
    fn test_lookup_parses_metadata_and_record() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::with_paths(vec![fake_site_packages(&dir)]);

        let pkg = store.lookup("requests").unwrap();
        assert_eq!(pkg.name.as_deref(), Some("requests"));
        assert_eq!(pkg.version.as_deref(), Some("2.25.1"));
        assert_eq!(pkg.license_field.as_deref(), Some("Apache 2.0"));
        assert_eq!(pkg.classifiers.len(), 2);
        assert_eq!(pkg.size, 1000);
    }

    #[test]
    fn test_lookup_is_name_normalized() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::with_paths(vec![fake_site_packages(&dir)]);
        assert!(store.lookup("Requests").is_some());
        assert!(store.lookup("flask").is_none());
    }

    #[test]
    fn test_body_text_is_not_parsed_as_headers() {
        let pkg = parse_metadata(METADATA);
        assert_eq!(pkg.license_field.as_deref(), Some("Apache 2.0"));
    }
}
