use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;

use crate::models::{PackageInfo, UNKNOWN};

use super::{license_from_classifiers, split_name_email};

/// Fetch publication metadata for a package from the registry's JSON API.
///
/// Timeouts, connection failures, non-2xx responses and responses missing
/// the expected fields all surface as `Err`; the caller treats every
/// failure uniformly as "not found".
pub async fn fetch_package(
    client: &Client,
    base_url: &str,
    name: &str,
    timeout: Duration,
) -> Result<PackageInfo> {
    let url = format!("{}/pypi/{}/json", base_url.trim_end_matches('/'), name);

    let response = client
        .get(&url)
        .header("User-Agent", "licenseer/0.1.0")
        .timeout(timeout)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("registry returned {} for {}", response.status(), name));
    }

    let data: serde_json::Value = response.json().await?;
    package_from_json(&data)
}

/// Build a [`PackageInfo`] from a registry JSON body. Pure, for testability.
pub(crate) fn package_from_json(data: &serde_json::Value) -> Result<PackageInfo> {
    let info = data
        .get("info")
        .and_then(|i| i.as_object())
        .ok_or_else(|| anyhow!("registry response has no info object"))?;

    let str_field = |key: &str| {
        info.get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let name = str_field("name").ok_or_else(|| anyhow!("registry response has no name"))?;
    let mut pkg = PackageInfo::new(name)?;

    if let Some(version) = str_field("version") {
        pkg.latest_version = version;
    }
    pkg.homepage = str_field("home_page");
    pkg.author = str_field("author");

    if let Some(raw) = str_field("author_email") {
        let (_, email) = split_name_email(&raw);
        pkg.author_email = email.or(Some(raw));
    }

    // Classifiers take precedence over the flat license field.
    let classifiers: Vec<String> = info
        .get("classifiers")
        .and_then(|c| c.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let from_classifiers = license_from_classifiers(&classifiers);
    pkg.license = if from_classifiers != UNKNOWN {
        from_classifiers
    } else {
        str_field("license")
            .map(|l| l.to_uppercase())
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    // Size of the most recently listed distribution artifact.
    pkg.size = data
        .get("urls")
        .and_then(|u| u.as_array())
        .and_then(|arr| arr.last())
        .and_then(|last| last.get("size"))
        .and_then(|s| s.as_i64())
        .unwrap_or(-1);

    Ok(pkg)
}
