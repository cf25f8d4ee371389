//! `licenseer` — inventory a Python project's dependencies and detect the
//! licenses governing them.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]).
//! 3. Scan the project tree for license-bearing files and classify each
//!    ([`license::scanner`]).
//! 4. Detect and parse the dependency manifest ([`reader`]).
//! 5. Resolve per-dependency metadata, local install first, registry as
//!    fallback ([`resolver`]).
//! 6. Optionally ask the AI advisor for a recommendation or a generated
//!    LICENSE file ([`advisor`]).
//! 7. Render the requested report ([`report`]).
//! 8. Exit `0` (all dependencies resolved) or `1` (at least one lookup
//!    failure).

mod advisor;
mod cli;
mod config;
mod license;
mod models;
mod reader;
mod report;
mod resolver;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use advisor::Advisor;
use cli::{Cli, ReportFormat};
use config::load_config;
use license::scanner::{FileFinder, LicenseFinder};
use models::{LicenseType, PackageInfo};
use reader::{
    DependencyFileReader, DependencyReader, PipfileReader, PyprojectReader, RequirementsReader,
};
use resolver::{LocalStore, Resolver};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let path = cli.path.canonicalize().unwrap_or_else(|_| cli.path.clone());
    let config = load_config(&path, cli.config.as_deref())?;

    // Project license scan
    let file_finder = FileFinder::with_excludes(&config.exclude_dirs);
    let license_finder = LicenseFinder::new(file_finder);

    let project_licenses: HashMap<PathBuf, LicenseType> = if cli.first {
        let first = license_finder.find_first_async(&path).await;
        if !cli.quiet {
            println!(" {} project license: {}", "→".cyan(), first);
        }
        HashMap::new()
    } else {
        license_finder.find_all_async(&path).await
    };

    // Dependency manifest
    let manifest = cli.manifest.clone().or_else(|| detect_manifest(&path));
    let dependencies: HashSet<String> = match &manifest {
        Some(manifest_path) => {
            let file_reader = DependencyFileReader::new(strategy_for(manifest_path));
            file_reader
                .list_dependencies(manifest_path)
                .with_context(|| format!("reading manifest {}", manifest_path.display()))?
        }
        None => {
            log::warn!("no dependency manifest found in {}", path.display());
            HashSet::new()
        }
    };

    if let Some(manifest_path) = &manifest {
        if !cli.quiet {
            eprintln!(
                "  {} {} {} dependencies",
                "→".cyan(),
                manifest_path.display(),
                dependencies.len()
            );
        }
    }

    // Metadata resolution, local install first, registry fallback
    let client = reqwest::Client::builder().build()?;
    let resolver = Resolver::new(
        client.clone(),
        LocalStore::discover(&path),
        config.registry_url.clone(),
        Duration::from_secs(config.timeout_secs),
    );

    let pb = if !cli.quiet && !dependencies.is_empty() {
        let pb = ProgressBar::new(dependencies.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let packages = resolver.resolve_many(&dependencies, pb.as_ref()).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let packages: Vec<PackageInfo> = packages.into_iter().collect();

    // AI advisor (optional)
    if cli.recommend || cli.generate_license.is_some() {
        let api_key = std::env::var("LICENSEER_API_KEY")
            .context("recommendation unavailable: LICENSEER_API_KEY is not set")?;
        let advisor = Advisor::new(client, &config.advisor, api_key);

        if cli.recommend {
            let summary = project_summary(&path, &project_licenses, &packages);
            let recommendation = advisor.recommend_license(&summary).await?;
            println!("\n {} recommended license: {}", "→".cyan(), recommendation.bold());
        }

        if let Some(license_type) = &cli.generate_license {
            let target = path.join("LICENSE");
            advisor.generate_license_file(license_type, &target).await?;
            println!(" {} wrote {}", "→".cyan(), target.display());
        }
    }

    // Report
    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&packages, &project_licenses, &path, &config.hide, cli.quiet)?;
        }
        ReportFormat::Json => {
            let licenses: HashMap<String, String> = project_licenses
                .iter()
                .map(|(file, license)| (file.display().to_string(), license.to_string()))
                .collect();
            let mut sorted: Vec<&PackageInfo> = packages.iter().collect();
            sorted.sort_by(|a, b| a.name.cmp(&b.name));
            let body = serde_json::json!({
                "project": path.display().to_string(),
                "licenses": licenses,
                "packages": sorted
                    .iter()
                    .map(|p| p.filtered_json(&config.hide))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    // Exit code: 1 if any dependency could not be resolved
    if packages.iter().any(|p| p.error_code != 0) {
        std::process::exit(1);
    }

    Ok(())
}

/// First recognized manifest in the project root, in precedence order.
fn detect_manifest(path: &Path) -> Option<PathBuf> {
    for name in ["Pipfile", "pyproject.toml", "requirements.txt"] {
        let candidate = path.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Pick the parser strategy for a manifest by its file name.
fn strategy_for(manifest: &Path) -> Box<dyn DependencyReader> {
    match manifest.file_name().and_then(|n| n.to_str()) {
        Some("Pipfile") => Box::new(PipfileReader),
        Some("pyproject.toml") => Box::new(PyprojectReader),
        _ => Box::new(RequirementsReader),
    }
}

/// Plain-text project description fed to the advisor.
fn project_summary(
    path: &Path,
    licenses: &HashMap<PathBuf, LicenseType>,
    packages: &[PackageInfo],
) -> String {
    let mut lines = vec![format!("Project: {}", path.display())];

    if !licenses.is_empty() {
        let mut found: Vec<String> = licenses
            .iter()
            .map(|(file, license)| format!("{}: {}", file.display(), license))
            .collect();
        found.sort();
        lines.push(format!("License files: {}", found.join(", ")));
    }

    if !packages.is_empty() {
        let mut deps: Vec<String> = packages
            .iter()
            .map(|p| format!("{} ({})", p.name, p.license))
            .collect();
        deps.sort();
        lines.push(format!("Dependencies: {}", deps.join(", ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_manifest_precedence() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "requests==2.25.1\n").unwrap();
        std::fs::write(dir.path().join("Pipfile"), "[packages]\n").unwrap();

        let manifest = detect_manifest(dir.path()).unwrap();
        assert_eq!(manifest.file_name().unwrap(), "Pipfile");
    }

    #[test]
    fn test_detect_manifest_none() {
        let dir = TempDir::new().unwrap();
        assert!(detect_manifest(dir.path()).is_none());
    }

    #[test]
    fn test_project_summary_mentions_dependencies() {
        let mut pkg = PackageInfo::new("requests").unwrap();
        pkg.license = "APACHE SOFTWARE LICENSE".to_string();
        let summary = project_summary(Path::new("/tmp/example"), &HashMap::new(), &[pkg]);
        assert!(summary.contains("requests (APACHE SOFTWARE LICENSE)"));
    }
}
