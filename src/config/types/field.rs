//! Type-safe config field path.

use owo_colors::OwoColorize;
use std::fmt;

/// Dotted path of a config field, used to label diagnostics.
///
/// ```ignore
/// const FIELD_PORT: FieldPath = FieldPath::new("serve.port");
/// diag.error(FIELD_PORT, "port 0 is reserved");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Table holding the field: `build.styles` for `build.styles.filename`.
    pub fn section(&self) -> &'static str {
        self.0.rsplit_once('.').map_or("", |(section, _)| section)
    }

    /// Last path segment: `filename` for `build.styles.filename`.
    pub fn key(&self) -> &'static str {
        self.0.rsplit_once('.').map_or(self.0, |(_, key)| key)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}
