//! Project license detection.
//!
//! - [`classifier`] — maps free-form license text to a
//!   [`LicenseType`](crate::models::LicenseType) and extracts the
//!   declaration from the location-specific formats (dedicated LICENSE
//!   files, `pyproject.toml`, `setup.cfg`).
//! - [`scanner`] — walks a directory tree for candidate files and applies
//!   the classifier per file, sequentially or concurrently.

pub mod classifier;
pub mod scanner;
