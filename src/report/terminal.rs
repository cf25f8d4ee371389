use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::models::{LicenseType, PackageInfo};

/// Package fields renderable as table columns, in display order.
const COLUMNS: [(&str, &str); 7] = [
    ("name", "Package"),
    ("local_version", "Installed"),
    ("latest_version", "Latest"),
    ("license", "License"),
    ("author", "Author"),
    ("author_email", "Email"),
    ("size", "Size"),
];

/// Render the colored terminal report.
pub fn render(
    packages: &[PackageInfo],
    licenses: &HashMap<PathBuf, LicenseType>,
    path: &Path,
    hide: &[String],
    quiet: bool,
) -> Result<()> {
    let total = packages.len();
    let failed = packages.iter().filter(|p| p.error_code != 0).count();
    let resolved = total - failed;

    if quiet {
        println!(
            "Dependencies: {}  Resolved: {}  Failed: {}",
            total,
            resolved.to_string().green(),
            failed.to_string().red(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "licenseer".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Scanning: {}\n", path.display());

    // Project license section
    if licenses.is_empty() {
        println!(" {} no license-bearing files found", "→".cyan());
    } else {
        println!(" {} project license files:", "→".cyan());
        let mut entries: Vec<_> = licenses.iter().collect();
        entries.sort_by_key(|(p, _)| p.to_path_buf());
        for (file, license) in entries {
            let label = match license {
                LicenseType::None => license.to_string().dimmed(),
                LicenseType::Unknown => license.to_string().yellow(),
                _ => license.to_string().green(),
            };
            println!("   {:<40} {}", file.display(), label);
        }
    }
    println!();

    // Dependency table
    if total > 0 {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let visible: Vec<&(&str, &str)> = COLUMNS
            .iter()
            .filter(|(key, _)| !hide.iter().any(|h| h.eq_ignore_ascii_case(key)))
            .collect();
        table.set_header(visible.iter().map(|(_, title)| *title));

        let mut sorted: Vec<&PackageInfo> = packages.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        for pkg in sorted {
            let color = if pkg.error_code != 0 {
                Color::Red
            } else {
                Color::Reset
            };
            table.add_row(visible.iter().map(|(key, _)| {
                Cell::new(field_text(pkg, key)).fg(color)
            }));
        }

        println!("{table}\n");
    }

    println!(
        " Total: {}  Resolved: {}  Failed: {}",
        total,
        resolved.to_string().green(),
        failed.to_string().red(),
    );
    Ok(())
}

fn field_text(pkg: &PackageInfo, key: &str) -> String {
    match key {
        "name" => pkg.name.clone(),
        "local_version" => pkg.local_version.clone(),
        "latest_version" => pkg.latest_version.clone(),
        "license" => pkg.license.clone(),
        "author" => pkg.author.clone().unwrap_or_else(|| "-".to_string()),
        "author_email" => pkg.author_email.clone().unwrap_or_else(|| "-".to_string()),
        "size" => human_size(pkg.size),
        _ => String::new(),
    }
}

fn human_size(size: i64) -> String {
    if size < 0 {
        return "?".to_string();
    }
    let size = size as f64;
    if size >= 1_048_576.0 {
        format!("{:.1} MB", size / 1_048_576.0)
    } else if size >= 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else {
        format!("{} B", size as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(-1), "?");
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3_145_728), "3.0 MB");
    }

    #[test]
    fn test_field_text_defaults_for_missing_contact() {
        let pkg = PackageInfo::new("example").unwrap();
        assert_eq!(field_text(&pkg, "author"), "-");
        assert_eq!(field_text(&pkg, "license"), "UNKNOWN");
        assert_eq!(field_text(&pkg, "size"), "?");
    }
}
