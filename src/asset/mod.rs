//! Source discovery and static copying.
//!
//! - [`scan`]: resolve stylesheet globs into an ordered, de-duplicated list
//! - [`copy`]: apply `[[build.copy]]` rules to the output directory

mod copy;
mod scan;

pub use copy::{CopyReport, run_copy};
pub use scan::scan_styles;
