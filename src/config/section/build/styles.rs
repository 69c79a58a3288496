//! `[build.styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build.styles]
//! inputs = ["src/client/styles/css/*.css", "src/client/styles/less/**/*.less"]
//! vendor = ["vendor/normalize/normalize.css"]   # placed before inputs
//! output = "styles/css"                         # relative to build.output
//! filename = "style.min.css"
//! browsers = ["ie >= 9", "chrome >= 34"]
//!
//! [build.styles.compiler]
//! command = ["lessc", "-"]
//! extensions = ["less"]
//! include_paths = ["vendor"]
//!
//! [build.styles.rebase]
//! enable = true
//! fonts = "../../fonts"
//! images = "../../images"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::pipeline::transform::parse_browsers;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FIELD_INPUTS: FieldPath = FieldPath::new("build.styles.inputs");
const FIELD_VENDOR: FieldPath = FieldPath::new("build.styles.vendor");
const FIELD_OUTPUT: FieldPath = FieldPath::new("build.styles.output");
const FIELD_FILENAME: FieldPath = FieldPath::new("build.styles.filename");
const FIELD_BROWSERS: FieldPath = FieldPath::new("build.styles.browsers");
const FIELD_COMMAND: FieldPath = FieldPath::new("build.styles.compiler.command");
const FIELD_EXTENSIONS: FieldPath = FieldPath::new("build.styles.compiler.extensions");

/// Stylesheet pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Glob patterns for project stylesheets, in bundle order.
    pub inputs: Vec<String>,
    /// Third-party stylesheets bundled ahead of `inputs`.
    pub vendor: Vec<String>,
    /// Bundle directory, relative to `build.output`.
    pub output: PathBuf,
    /// Bundle file name.
    pub filename: String,
    /// Browserslist queries for vendor prefixing.
    pub browsers: Vec<String>,
    /// Preprocessor settings.
    pub compiler: CompilerConfig,
    /// `url()` rewriting.
    pub rebase: RebaseConfig,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            inputs: vec![
                "src/client/styles/css/*.css".into(),
                "src/client/styles/less/*.less".into(),
                "src/client/styles/less/**/*.less".into(),
            ],
            vendor: Vec::new(),
            output: PathBuf::from("styles/css"),
            filename: "style.min.css".into(),
            browsers: [
                "ie >= 9",
                "ie_mob >= 10",
                "ff >= 30",
                "chrome >= 34",
                "safari >= 7",
                "opera >= 23",
                "ios >= 7",
                "android >= 4.4",
                "bb >= 10",
            ]
            .map(String::from)
            .to_vec(),
            compiler: CompilerConfig::default(),
            rebase: RebaseConfig::default(),
        }
    }
}

/// `[build.styles.compiler]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Command that reads a stylesheet on stdin and writes CSS to stdout.
    pub command: Vec<String>,
    /// Input extensions routed through the compiler; others are bundled as-is.
    pub extensions: Vec<String>,
    /// Import search paths (relative to the project root, `~` expanded).
    pub include_paths: Vec<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: vec!["lessc".into(), "-".into()],
            extensions: vec!["less".into()],
            include_paths: Vec::new(),
        }
    }
}

impl CompilerConfig {
    /// Whether files with `ext` go through the compiler.
    pub fn compiles(&self, ext: Option<&str>) -> bool {
        ext.is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// `[build.styles.rebase]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RebaseConfig {
    pub enable: bool,
    /// Prefix for rewritten font references.
    pub fonts: String,
    /// Prefix for rewritten image references.
    pub images: String,
}

impl Default for RebaseConfig {
    fn default() -> Self {
        Self {
            enable: true,
            fonts: "../../fonts".into(),
            images: "../../images".into(),
        }
    }
}

impl StylesConfig {
    /// Reject absolute paths before normalization makes every path absolute.
    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        if self.output.is_absolute() {
            diag.error_with_hint(
                FIELD_OUTPUT,
                format!("must be relative to build.output: {}", self.output.display()),
                "use a path such as \"styles/css\"",
            );
        }
    }

    /// Resolve include paths against the project root.
    pub fn normalize(&mut self, root: &Path) {
        self.compiler.include_paths = self
            .compiler
            .include_paths
            .iter()
            .map(|p| {
                let expanded = shellexpand::tilde(&p.to_string_lossy()).into_owned();
                crate::utils::path::normalize_path(&root.join(expanded))
            })
            .collect();
    }

    /// Validate the section.
    ///
    /// `needs_compiler` is false for commands that never run the styles step.
    pub fn validate(&self, needs_compiler: bool, diag: &mut ConfigDiagnostics) {
        if self.inputs.is_empty() && self.vendor.is_empty() {
            diag.hint(FIELD_INPUTS, "no stylesheet inputs, the styles step will be skipped");
        }

        for (field, patterns) in [(FIELD_INPUTS, &self.inputs), (FIELD_VENDOR, &self.vendor)] {
            for pattern in patterns {
                if let Err(e) = glob::Pattern::new(pattern) {
                    diag.error(field, format!("invalid glob `{pattern}`: {e}"));
                }
            }
        }

        if self.filename.trim().is_empty() {
            diag.error(FIELD_FILENAME, "bundle file name must not be empty");
        } else if self.filename.contains(['/', '\\']) {
            diag.error_with_hint(
                FIELD_FILENAME,
                format!("`{}` is a path, not a file name", self.filename),
                format!("put directories in {FIELD_OUTPUT}"),
            );
        }

        if let Err(e) = parse_browsers(&self.browsers) {
            diag.error(FIELD_BROWSERS, format!("invalid browser query: {e}"));
        }

        if self.compiler.extensions.is_empty() {
            diag.hint(FIELD_EXTENSIONS, "empty, every stylesheet is bundled without compiling");
        }

        if needs_compiler {
            self.validate_command(diag);
        }
    }

    fn validate_command(&self, diag: &mut ConfigDiagnostics) {
        let Some(cmd) = self.compiler.command.first() else {
            diag.error(FIELD_COMMAND, format!("{FIELD_COMMAND} is empty"));
            return;
        };

        let is_package_runner = ["npx", "bunx", "pnpx", "yarn", "dlx"].contains(&cmd.as_str());
        if which::which(cmd).is_ok() {
            return;
        }

        if is_package_runner {
            // Package runners can download packages at runtime, just hint
            if let Some(package) = self.compiler.command.get(1) {
                diag.hint(
                    FIELD_COMMAND,
                    format!("`{package}` via `{cmd}`, ensure the package is installed"),
                );
            }
        } else {
            diag.error_with_hint(
                FIELD_COMMAND,
                format!("`{cmd}` not found"),
                format!("install it (npm i -g less) or update {FIELD_COMMAND}"),
            );
        }
    }
}
