//! The file value that moves through the pipeline.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// One stylesheet moving through the pipeline.
///
/// `content` is replaced at every stage; `name` and `path` never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Basename of the origin path (`main.less`).
    pub name: String,
    /// Where the unit was read from.
    pub path: PathBuf,
    /// Text at the current stage.
    pub content: String,
}

impl Unit {
    /// Create a unit; the name is derived from the path's basename.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            path,
            content: content.into(),
        }
    }

    /// Read a unit from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::new(path, content))
    }

    /// Lower-cased extension of the origin path.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// Replace the content, keeping identity.
    #[inline]
    pub fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }
}
