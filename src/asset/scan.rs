//! Stylesheet scanning (pure, no side effects).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;

use crate::config::StylesConfig;

/// Resolve `vendor` then `inputs` globs against `root`.
///
/// Files keep pattern order; within one pattern they are sorted by path.
/// A file matched by several patterns keeps its first position.
pub fn scan_styles(styles: &StylesConfig, root: &Path) -> Result<Vec<PathBuf>> {
    let mut seen = FxHashSet::default();
    let mut files = Vec::new();

    for pattern in styles.vendor.iter().chain(&styles.inputs) {
        for path in expand(pattern, root)? {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Expand one glob into the files it matches.
fn expand(pattern: &str, root: &Path) -> Result<Vec<PathBuf>> {
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let base = glob::Pattern::escape(&root.to_string_lossy());
        format!("{}/{}", base.trim_end_matches('/'), pattern)
    };

    let mut paths: Vec<PathBuf> = glob::glob(&full)
        .with_context(|| format!("invalid glob `{pattern}`"))?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        crate::debug!("styles"; "`{}` matched nothing", pattern);
    }
    Ok(paths)
}
