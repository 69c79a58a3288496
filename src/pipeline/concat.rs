//! Concatenate processed units into one bundle file.

use super::Unit;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Join unit contents in order, one newline between units.
pub fn concat(units: &[Unit]) -> String {
    let mut bundle = String::with_capacity(units.iter().map(|u| u.content.len() + 1).sum());
    for (i, unit) in units.iter().enumerate() {
        if i > 0 {
            bundle.push('\n');
        }
        bundle.push_str(&unit.content);
    }
    bundle
}

/// Write the bundle to `dir/filename`, creating `dir` if needed.
pub fn write_bundle(dir: &Path, filename: &str, bundle: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(filename);
    fs::write(&path, bundle).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
