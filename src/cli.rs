use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "licenseer",
    about = "Inventory a Python project's dependencies and detect the licenses governing them",
    version
)]
pub struct Cli {
    /// Project path to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Dependency manifest to parse [default: auto-detect Pipfile, pyproject.toml, requirements.txt]
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Stop at the first license-bearing file instead of scanning the whole tree
    #[arg(long)]
    pub first: bool,

    /// Config file [default: ./.licenseer/config.toml, fallback ~/.config/licenseer/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Ask the configured AI provider to recommend a project license
    #[arg(long)]
    pub recommend: bool,

    /// Generate a LICENSE file of the given type via the AI provider
    #[arg(long, value_name = "TYPE")]
    pub generate_license: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
