use std::path::Path;

use anyhow::Result;
use regex::Regex;

use crate::models::LicenseType;

/// Classify free-form license text into a [`LicenseType`].
///
/// First matchable category whose label occurs case-insensitively in the
/// text wins; no match (including empty or whitespace-only input) is
/// `Unknown`, never `None` — `None` is reserved for "no declaration
/// present".
pub fn classify(text: &str) -> LicenseType {
    let haystack = text.to_lowercase();
    for license_type in LicenseType::MATCHABLE {
        if haystack.contains(&license_type.label().to_lowercase()) {
            return license_type;
        }
    }
    LicenseType::Unknown
}

/// Extract and classify the license declared by one candidate file,
/// reading asynchronously.
///
/// Dispatch is by file name: a dedicated `LICENSE`/`LICENSE.*` file is
/// classified verbatim; `pyproject.toml` and `setup.cfg` contribute their
/// embedded declaration, or [`LicenseType::None`] when no declaration
/// exists. Read and parse errors surface as `Err` for the caller to log.
pub async fn extract_license_info(path: &Path) -> Result<LicenseType> {
    let content = tokio::fs::read_to_string(path).await?;
    interpret(path, &content)
}

/// Synchronous twin of [`extract_license_info`] for the sequential
/// retrieval modes.
pub fn extract_license_info_sync(path: &Path) -> Result<LicenseType> {
    let content = std::fs::read_to_string(path)?;
    interpret(path, &content)
}

fn interpret(path: &Path, content: &str) -> Result<LicenseType> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let license_file = Regex::new(r"(?i)^license(\..*)?$")?;
    if license_file.is_match(file_name) {
        return Ok(classify(content));
    }

    match file_name {
        "pyproject.toml" => from_pyproject(content),
        "setup.cfg" => Ok(from_setup_cfg(content)),
        _ => Ok(LicenseType::None),
    }
}

/// `tool.poetry.license` declaration, or `None` when absent.
fn from_pyproject(content: &str) -> Result<LicenseType> {
    let pyproject: toml::Value = content.parse()?;
    let license = pyproject
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("license"))
        .and_then(|l| l.as_str());

    Ok(match license {
        Some(text) => classify(text),
        None => LicenseType::None,
    })
}

/// First `license = ...` line, or `None` when absent.
fn from_setup_cfg(content: &str) -> LicenseType {
    for line in content.lines() {
        if line.starts_with("license =") {
            if let Some((_, value)) = line.split_once('=') {
                return classify(value.trim());
            }
        }
    }
    LicenseType::None
}
