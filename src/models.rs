use std::hash::{Hash, Hasher};

use anyhow::{bail, Result};
use serde::Serialize;

/// Placeholder for any metadata field we could not determine.
pub const UNKNOWN: &str = "UNKNOWN";

/// Separator used when a package declares several license classifiers.
pub const JOINS: &str = ";; ";

/// Canonical license categories.
///
/// Matching in [`crate::license::classifier::classify`] walks
/// [`LicenseType::MATCHABLE`] and returns the first variant whose label
/// occurs in the input. `None` and `Unknown` carry no searchable label:
/// `None` means "no license declaration found at all", `Unknown` means
/// "a declaration was found but not recognized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LicenseType {
    Mit,
    Apache,
    Gpl,
    Bsd,
    Isc,
    Mpl,
    Epl,
    Agpl,
    Lgpl,
    Unlicense,
    Zlib,
    Artistic,
    Cc0,
    None,
    Unknown,
}

impl LicenseType {
    /// Variants with a recognizable label, in matching order.
    ///
    /// Invariant: no earlier label may be a substring of a later one.
    /// "General Public License" is a substring of both the Affero and
    /// Lesser labels, so `Agpl` and `Lgpl` must precede `Gpl` here even
    /// though `Gpl` is declared first in the enum.
    pub const MATCHABLE: [LicenseType; 13] = [
        LicenseType::Mit,
        LicenseType::Apache,
        LicenseType::Bsd,
        LicenseType::Isc,
        LicenseType::Mpl,
        LicenseType::Epl,
        LicenseType::Agpl,
        LicenseType::Lgpl,
        LicenseType::Gpl,
        LicenseType::Unlicense,
        LicenseType::Zlib,
        LicenseType::Artistic,
        LicenseType::Cc0,
    ];

    /// Label searched for (case-insensitively) in license text.
    ///
    /// The GNU family omits the "GNU " prefix so that texts quoting the
    /// license name informally ("Lesser General Public License (LGPL
    /// v3.0)") still classify.
    pub fn label(&self) -> &'static str {
        match self {
            LicenseType::Mit => "MIT License",
            LicenseType::Apache => "Apache License",
            LicenseType::Gpl => "General Public License",
            LicenseType::Bsd => "BSD License",
            LicenseType::Isc => "ISC License",
            LicenseType::Mpl => "Mozilla Public License",
            LicenseType::Epl => "Eclipse Public License",
            LicenseType::Agpl => "Affero General Public License",
            LicenseType::Lgpl => "Lesser General Public License",
            LicenseType::Unlicense => "The Unlicense",
            LicenseType::Zlib => "Zlib License",
            LicenseType::Artistic => "Artistic License",
            LicenseType::Cc0 => "CC0 1.0 Universal",
            LicenseType::None => "NONE",
            LicenseType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for LicenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LicenseType::Mit => "MIT",
            LicenseType::Apache => "APACHE",
            LicenseType::Gpl => "GPL",
            LicenseType::Bsd => "BSD",
            LicenseType::Isc => "ISC",
            LicenseType::Mpl => "MPL",
            LicenseType::Epl => "EPL",
            LicenseType::Agpl => "AGPL",
            LicenseType::Lgpl => "LGPL",
            LicenseType::Unlicense => "UNLICENSE",
            LicenseType::Zlib => "ZLIB",
            LicenseType::Artistic => "ARTISTIC",
            LicenseType::Cc0 => "CC0",
            LicenseType::None => "NONE",
            LicenseType::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

/// Resolved metadata for one dependency.
///
/// Identity (equality and hashing) is the `(name, local_version,
/// latest_version)` triple only; other fields do not participate, so a set
/// of `PackageInfo` de-duplicates on that triple.
#[derive(Debug, Clone, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub local_version: String,
    pub latest_version: String,
    /// Installed or published size in bytes; -1 when unknown.
    pub size: i64,
    pub homepage: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    /// Upper-cased license string, `"UNKNOWN"` when undetermined.
    pub license: String,
    /// Left false by resolution; compatibility checking is a separate pass.
    pub is_license_compatible: bool,
    /// 0 = resolved, 1 = both local and registry lookup failed.
    pub error_code: u8,
}

impl PackageInfo {
    /// Create a record with every optional field at its default.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            bail!("package name must not be empty");
        }
        Ok(PackageInfo {
            name,
            local_version: UNKNOWN.to_string(),
            latest_version: UNKNOWN.to_string(),
            size: -1,
            homepage: None,
            author: None,
            author_email: None,
            license: UNKNOWN.to_string(),
            is_license_compatible: false,
            error_code: 0,
        })
    }

    pub fn name_with_version(&self) -> String {
        format!("{}-{}", self.name, self.local_version)
    }

    /// JSON object for reporting, minus the fields named in `hide`
    /// (case-insensitive field names).
    pub fn filtered_json(&self, hide: &[String]) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.retain(|k, _| !hide.iter().any(|h| h.eq_ignore_ascii_case(k)));
        }
        value
    }
}

impl PartialEq for PackageInfo {
    fn eq(&self, other: &Self) -> bool {
        (&self.name, &self.local_version, &self.latest_version)
            == (&other.name, &other.local_version, &other.latest_version)
    }
}

impl Eq for PackageInfo {}

impl Hash for PackageInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.local_version.hash(state);
        self.latest_version.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_name_rejected() {
        assert!(PackageInfo::new("").is_err());
        assert!(PackageInfo::new("requests").is_ok());
    }

    #[test]
    fn test_identity_ignores_other_fields() {
        let mut a = PackageInfo::new("requests").unwrap();
        a.local_version = "2.25.1".to_string();
        let mut b = a.clone();
        b.license = "MIT LICENSE".to_string();
        b.size = 12345;
        b.error_code = 1;

        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_identity_differs_on_version() {
        let mut a = PackageInfo::new("requests").unwrap();
        a.local_version = "2.25.1".to_string();
        let mut b = PackageInfo::new("requests").unwrap();
        b.local_version = "2.26.0".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_filtered_json_hides_fields() {
        let info = PackageInfo::new("requests").unwrap();
        let value = info.filtered_json(&["LICENSE".to_string(), "size".to_string()]);
        let map = value.as_object().unwrap();
        assert!(map.contains_key("name"));
        assert!(!map.contains_key("license"));
        assert!(!map.contains_key("size"));
    }

    #[test]
    fn test_no_matchable_label_shadows_a_later_one() {
        let labels: Vec<String> = LicenseType::MATCHABLE
            .iter()
            .map(|lt| lt.label().to_lowercase())
            .collect();
        for (i, earlier) in labels.iter().enumerate() {
            for later in &labels[i + 1..] {
                assert!(
                    !later.contains(earlier),
                    "label {:?} shadows {:?}",
                    earlier,
                    later
                );
            }
        }
    }
}
