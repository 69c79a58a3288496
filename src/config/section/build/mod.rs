//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "dist"             # Output directory (relative to project root)
//! minify = true               # Minify the stylesheet bundle
//!
//! [build.styles]              # see `styles`
//! [[build.copy]]              # see `copy`
//! ```

mod copy;
mod styles;

pub use copy::CopyRule;
pub use styles::{CompilerConfig, StylesConfig};

use crate::config::ConfigDiagnostics;
use crate::utils::path::normalize_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Build output directory.
    pub output: PathBuf,

    /// Minify the stylesheet bundle.
    pub minify: bool,

    /// Stylesheet pipeline.
    pub styles: StylesConfig,

    /// Static copy rules; `None` means the built-in defaults.
    pub copy: Option<Vec<CopyRule>>,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist"),
            minify: true,
            styles: StylesConfig::default(),
            copy: None,
        }
    }
}

impl BuildSectionConfig {
    /// Declared copy rules, or the defaults when none are declared.
    pub fn copy_rules(&self) -> Vec<CopyRule> {
        self.copy.clone().unwrap_or_else(CopyRule::defaults)
    }

    /// Pre-validate paths that must stay relative.
    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        self.styles.validate_paths(diag);
        copy::validate_paths(&self.copy_rules(), diag);
    }

    /// Resolve every path against the project root.
    pub fn normalize(&mut self, root: &Path) {
        self.output = normalize_path(&root.join(&self.output));
        self.styles.normalize(root);
        let rules = self
            .copy_rules()
            .into_iter()
            .map(|rule| CopyRule {
                from: normalize_path(&root.join(&rule.from)),
                ..rule
            })
            .collect();
        self.copy = Some(rules);
    }

    /// Absolute bundle directory (valid after `normalize`).
    pub fn styles_dir(&self) -> PathBuf {
        self.output.join(&self.styles.output)
    }

    pub fn validate(&self, needs_compiler: bool, diag: &mut ConfigDiagnostics) {
        self.styles.validate(needs_compiler, diag);
        copy::validate(&self.copy_rules(), diag);
    }
}
