//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization and mtime comparison

pub mod fs;

pub use fs::{is_up_to_date, normalize_path};
