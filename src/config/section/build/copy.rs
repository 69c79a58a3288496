//! `[[build.copy]]` static copy rules.
//!
//! # Example
//!
//! ```toml
//! [[build.copy]]
//! from = "src/client/images"      # relative to the project root
//! to = "images"                   # relative to build.output
//! pattern = "**/*"                # matched against paths relative to `from`
//!
//! [[build.copy]]
//! from = "vendor"
//! to = "fonts"
//! pattern = "**/*.woff2"
//! flatten = true                  # drop sub-directories, keep basenames
//! ```
//!
//! With no `[[build.copy]]` entries the defaults copy top-level files of
//! `src/client` plus its `images`, `fonts`, `json` and `svg` directories.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FIELD_COPY: FieldPath = FieldPath::new("build.copy");

/// One copy rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyRule {
    /// Source directory.
    pub from: PathBuf,
    /// Destination directory inside the output.
    pub to: PathBuf,
    /// Glob selecting files under `from`.
    pub pattern: String,
    /// Globs (relative to `from`) excluded from the copy.
    pub exclude: Vec<String>,
    /// Copy matched files directly into `to`.
    pub flatten: bool,
}

impl Default for CopyRule {
    fn default() -> Self {
        Self {
            from: PathBuf::new(),
            to: PathBuf::new(),
            pattern: "**/*".into(),
            exclude: Vec::new(),
            flatten: false,
        }
    }
}

impl CopyRule {
    fn dir(kind: &str) -> Self {
        Self {
            from: Path::new("src/client").join(kind),
            to: PathBuf::from(kind),
            pattern: "*".into(),
            ..Self::default()
        }
    }

    /// Rules used when the config declares none.
    pub fn defaults() -> Vec<Self> {
        let mut rules = vec![Self {
            from: PathBuf::from("src/client"),
            to: PathBuf::new(),
            pattern: "*".into(),
            exclude: ["images", "fonts", "svg", "json", "styles", "scripts"]
                .map(String::from)
                .to_vec(),
            flatten: false,
        }];
        rules.extend(["images", "fonts", "json", "svg"].map(Self::dir));
        rules
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> String {
        format!("{}/{}", self.from.display(), self.pattern)
    }
}

/// Reject absolute destinations and malformed globs.
pub fn validate_paths(rules: &[CopyRule], diag: &mut ConfigDiagnostics) {
    for (i, rule) in rules.iter().enumerate() {
        if rule.to.is_absolute() {
            diag.error_with_hint(
                FIELD_COPY,
                format!("rule {i}: `to` must be relative to build.output: {}", rule.to.display()),
                "use a path such as \"images\"",
            );
        }
        if rule.to.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            diag.error(
                FIELD_COPY,
                format!("rule {i}: `to` must stay inside build.output: {}", rule.to.display()),
            );
        }
        for pattern in std::iter::once(&rule.pattern).chain(&rule.exclude) {
            if let Err(e) = glob::Pattern::new(pattern) {
                diag.error(FIELD_COPY, format!("rule {i}: invalid glob `{pattern}`: {e}"));
            }
        }
    }
}

/// Warn about source directories that do not exist.
pub fn validate(rules: &[CopyRule], diag: &mut ConfigDiagnostics) {
    for rule in rules {
        if !rule.from.is_dir() {
            diag.hint(
                FIELD_COPY,
                format!("{} does not exist, nothing to copy", rule.from.display()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults_when_absent() {
        let config = test_parse_config("");
        let rules = config.build.copy_rules();
        assert_eq!(rules.len(), 5);
        assert_eq!(rules[0].from, PathBuf::from("src/client"));
        assert!(rules[0].exclude.contains(&"styles".to_string()));
        assert_eq!(rules[1].from, PathBuf::from("src/client/images"));
        assert_eq!(rules[1].to, PathBuf::from("images"));
    }

    #[test]
    fn test_declared_rules_replace_defaults() {
        let config = test_parse_config(
            r#"
[[build.copy]]
from = "vendor"
to = "fonts"
pattern = "**/*.woff2"
flatten = true

[[build.copy]]
from = "public"
"#,
        );
        let rules = config.build.copy_rules();
        assert_eq!(rules.len(), 2);
        assert!(rules[0].flatten);
        assert_eq!(rules[1].pattern, "**/*");
        assert_eq!(rules[1].to, PathBuf::new());
    }

    #[test]
    fn test_validate_paths() {
        let rules = vec![
            CopyRule {
                to: PathBuf::from("/abs"),
                ..CopyRule::default()
            },
            CopyRule {
                to: PathBuf::from("../outside"),
                ..CopyRule::default()
            },
            CopyRule {
                exclude: vec!["[".into()],
                ..CopyRule::default()
            },
        ];
        let mut diag = ConfigDiagnostics::new();
        validate_paths(&rules, &mut diag);
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_label() {
        assert_eq!(CopyRule::dir("svg").label(), "src/client/svg/*");
    }
}
