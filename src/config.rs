use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Root configuration, deserialized from `.licenseer/config.toml`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the package registry queried when a dependency is not
    /// installed locally.
    pub registry_url: String,
    /// Per-request timeout for registry lookups, in seconds.
    pub timeout_secs: u64,
    /// Extra directory-name substrings pruned during the license scan, on
    /// top of the built-in list.
    pub exclude_dirs: Vec<String>,
    /// Package fields omitted from reports (case-insensitive names).
    pub hide: Vec<String>,
    pub advisor: AdvisorConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub base_url: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            registry_url: "https://pypi.org".to_string(),
            timeout_secs: 3,
            exclude_dirs: Vec::new(),
            hide: Vec::new(),
            advisor: AdvisorConfig::default(),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Load configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.licenseer/config.toml`
/// 3. `~/.config/licenseer/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = project_path.join(".licenseer").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("licenseer").join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}
