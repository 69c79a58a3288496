//! Configuration error types.
//!
//! Loading fails fast on I/O and TOML errors. Validation problems are
//! collected in [`ConfigDiagnostics`] and reported together, grouped by the
//! config table they belong to:
//!
//! ```text
//! config validation failed:
//!
//! [build.styles]
//!   → filename: must not be empty
//! [build.copy]
//!   → to: `../out` leaves build.output
//!     hint: use a path inside the output directory
//!
//! 2 errors
//! ```

use super::FieldPath;
use crate::utils::plural::plural_count;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a [`ProjectConfig`](crate::config::ProjectConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML")]
    Toml(#[from] toml::de::Error),

    #[error("no `{0}` in this directory or any parent (pass -C to point at one)")]
    NotFound(PathBuf),

    // No #[from]: source() would print the diagnostics twice
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One invalid field.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} {}: {}", "→".red(), self.field.key().cyan(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n    {} {}", "hint:".yellow(), hint)?;
        }
        Ok(())
    }
}

/// Problems collected while validating every section.
///
/// Errors abort loading; hints and unknown fields are only printed.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<ConfigDiagnostic>,
    hints: Vec<(FieldPath, String)>,
    unknown: Vec<String>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.errors.push(ConfigDiagnostic {
            field,
            message: message.into(),
            hint: None,
        });
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.errors.push(ConfigDiagnostic {
            field,
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    /// Note a setting that is valid but probably not what the user wants.
    pub fn hint(&mut self, field: FieldPath, message: impl Into<String>) {
        self.hints.push((field, message.into()));
    }

    /// Record fields the deserializer ignored.
    pub fn unknown_fields(&mut self, fields: impl IntoIterator<Item = String>) {
        self.unknown.extend(fields);
    }

    /// Print hints and unknown fields; errors are reported by the caller.
    pub fn print_warnings(&self) {
        for (field, message) in &self.hints {
            crate::log!("hint"; "{}: {}", field.as_str(), message);
        }
        if !self.unknown.is_empty() {
            crate::log!("warning"; "ignoring unknown config fields: {}", self.unknown.join(", "));
        }
    }

    /// `Err(self)` when any error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[ConfigDiagnostic] {
        &self.errors
    }

    #[cfg(test)]
    pub fn hints(&self) -> &[(FieldPath, String)] {
        &self.hints
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "config validation failed:".red().bold())?;

        // Sections in order of first appearance
        let mut sections: Vec<&str> = Vec::new();
        for err in &self.errors {
            if !sections.contains(&err.field.section()) {
                sections.push(err.field.section());
            }
        }
        for section in sections {
            write!(f, "\n{}", format_args!("[{section}]").dimmed())?;
            for err in self.errors.iter().filter(|e| e.field.section() == section) {
                write!(f, "\n{err}")?;
            }
        }

        write!(f, "\n\n{}", plural_count(self.errors.len(), "error").red().bold())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    const FILENAME: FieldPath = FieldPath::new("build.styles.filename");
    const BROWSERS: FieldPath = FieldPath::new("build.styles.browsers");
    const PORT: FieldPath = FieldPath::new("serve.port");

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("assets.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io_err.to_string(), "cannot read `assets.toml`");

        let missing = ConfigError::NotFound(PathBuf::from("assets.toml"));
        assert!(missing.to_string().contains("any parent"));
    }

    fn plain(text: &str) -> String {
        regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap().replace_all(text, "").into_owned()
    }

    #[test]
    fn test_errors_grouped_by_section() {
        let mut diag = ConfigDiagnostics::new();
        diag.error(FILENAME, "must not be empty");
        diag.error(PORT, "port 0 is reserved");
        diag.error_with_hint(BROWSERS, "bad query", "see browsersl.ist");

        let shown = plain(&diag.to_string());
        let styles = shown.find("[build.styles]").unwrap();
        let serve = shown.find("[serve]").unwrap();
        assert!(styles < serve);
        assert_eq!(shown.matches("[build.styles]").count(), 1);
        assert!(shown.contains("→ filename: must not be empty"));
        assert!(shown.contains("→ browsers: bad query\n    hint: see browsersl.ist"));
        assert!(shown.ends_with("3 errors"));
    }

    #[test]
    fn test_hints_and_unknown_fields_do_not_fail() {
        let mut diag = ConfigDiagnostics::new();
        diag.hint(FILENAME, "unusual name");
        diag.unknown_fields(["serve.watch".to_string()]);
        assert_eq!(diag.len(), 0);
        assert_eq!(diag.hints().len(), 1);
        assert!(diag.into_result().is_ok());
    }

    #[test]
    fn test_any_error_fails() {
        let mut diag = ConfigDiagnostics::new();
        diag.error(PORT, "port 0 is reserved");
        assert_eq!(diag.errors()[0].field, PORT);
        assert!(diag.into_result().is_err());
    }
}
