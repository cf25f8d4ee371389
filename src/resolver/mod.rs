//! Per-dependency metadata resolution with a local-then-remote fallback.
//!
//! [`Resolver::resolve_one`] first consults the installed-distribution
//! metadata store ([`local::LocalStore`]) and only then queries the remote
//! registry ([`pypi`]). When both miss, it degrades to a minimal record with
//! `error_code = 1` so that batch resolution never aborts.

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use indicatif::ProgressBar;
use reqwest::Client;

use crate::models::{PackageInfo, JOINS, UNKNOWN};

pub mod local;
pub mod pypi;

pub use local::LocalStore;

/// Dependencies are resolved concurrently in batches of this size.
const BATCH_SIZE: usize = 32;

/// Derive a license string from a package's trove classifiers.
///
/// Keeps entries starting with `"License"`, takes the last `" :: "`
/// segment, and drops the bare `"OSI Approved"` qualifier. Multiple names
/// join with `";; "` in discovery order; no usable entry yields `"UNKNOWN"`.
pub fn license_from_classifiers(classifiers: &[String]) -> String {
    let mut licenses: Vec<&str> = Vec::new();
    for classifier in classifiers {
        if !classifier.starts_with("License") {
            continue;
        }
        let last = classifier.split(" :: ").last().unwrap_or(classifier);
        if last != "OSI Approved" {
            licenses.push(last);
        }
    }
    if licenses.is_empty() {
        UNKNOWN.to_string()
    } else {
        licenses.join(JOINS).to_uppercase()
    }
}

/// Split an `Author <email@host>` contact string into its parts.
pub(crate) fn split_name_email(raw: &str) -> (Option<String>, Option<String>) {
    match raw.split_once('<') {
        Some((name, email)) => {
            let name = name.trim();
            let email = email.trim_end_matches('>').trim();
            (
                (!name.is_empty()).then(|| name.to_string()),
                (!email.is_empty()).then(|| email.to_string()),
            )
        }
        None => (None, None),
    }
}

/// Strip `"name=version"` entries to bare names, dropping the interpreter
/// self-reference and duplicates.
fn requirement_names(deps: &HashSet<String>) -> Vec<String> {
    let mut names: Vec<String> = deps
        .iter()
        .map(|dep| dep.split('=').next().unwrap_or(dep).trim().to_string())
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("python"))
        .collect();
    names.sort();
    names.dedup();
    names
}

pub struct Resolver {
    client: Client,
    local: LocalStore,
    registry_url: String,
    timeout: Duration,
}

impl Resolver {
    /// The HTTP client is injected so callers can share one (possibly
    /// caching) client across the process.
    pub fn new(client: Client, local: LocalStore, registry_url: String, timeout: Duration) -> Self {
        Self {
            client,
            local,
            registry_url,
            timeout,
        }
    }

    /// Resolve a single package, never failing: lookup misses degrade to a
    /// minimal record with `error_code = 1`.
    pub async fn resolve_one(&self, name: &str) -> PackageInfo {
        if let Some(installed) = self.local.lookup(name) {
            return package_from_installed(name, installed);
        }

        match pypi::fetch_package(&self.client, &self.registry_url, name, self.timeout).await {
            Ok(pkg) => pkg,
            Err(err) => {
                log::warn!("could not resolve {}: {}", name, err);
                degraded(name)
            }
        }
    }

    /// Resolve every `"name=version"` entry, skipping the `python`
    /// interpreter pin. One failed lookup never aborts the rest.
    pub async fn resolve_many(
        &self,
        deps: &HashSet<String>,
        progress: Option<&ProgressBar>,
    ) -> HashSet<PackageInfo> {
        let names = requirement_names(deps);
        let mut packages = HashSet::with_capacity(names.len());

        for batch in names.chunks(BATCH_SIZE) {
            let futures: Vec<_> = batch.iter().map(|name| self.resolve_one(name)).collect();
            for pkg in join_all(futures).await {
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                packages.insert(pkg);
            }
        }

        packages
    }
}

/// Minimal record for a dependency neither installed nor published.
fn degraded(name: &str) -> PackageInfo {
    PackageInfo {
        name: name.to_string(),
        local_version: UNKNOWN.to_string(),
        latest_version: UNKNOWN.to_string(),
        size: -1,
        homepage: None,
        author: None,
        author_email: None,
        license: UNKNOWN.to_string(),
        is_license_compatible: false,
        error_code: 1,
    }
}

/// Build a [`PackageInfo`] from installed-distribution metadata.
fn package_from_installed(queried: &str, installed: local::InstalledPackage) -> PackageInfo {
    let name = installed
        .name
        .clone()
        .unwrap_or_else(|| queried.to_string());
    let mut pkg = match PackageInfo::new(name) {
        Ok(pkg) => pkg,
        Err(_) => return degraded(queried),
    };

    if let Some(version) = installed.version {
        pkg.local_version = version;
    }
    pkg.homepage = installed.homepage;

    // Maintainer contact wins over author contact.
    pkg.author = installed.maintainer.or(installed.author);
    pkg.author_email = installed.maintainer_email;
    if pkg.author_email.is_none() {
        if let Some(raw) = installed.author_email {
            let (from_email, email) = split_name_email(&raw);
            pkg.author_email = email.or(Some(raw));
            if pkg.author.is_none() {
                pkg.author = from_email;
            }
        }
    }

    let from_classifiers = license_from_classifiers(&installed.classifiers);
    pkg.license = if from_classifiers != UNKNOWN {
        from_classifiers
    } else {
        installed
            .license_field
            .map(|l| l.to_uppercase())
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    pkg.size = installed.size;
    pkg
}
