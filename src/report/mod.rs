//! Report rendering for resolved packages and scanned project licenses.

pub mod terminal;
