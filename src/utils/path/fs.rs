//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `is_up_to_date` - mtime comparison used to skip unchanged copies

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

fn mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check if `output` exists and is at least as new as `source`
///
/// Returns `false` if either file is missing or times can't be read
pub fn is_up_to_date(source: &Path, output: &Path) -> bool {
    let (Some(src), Some(dst)) = (mtime(source), mtime(output)) else {
        return false;
    };
    src <= dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_is_up_to_date() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.css");
        let dst = dir.path().join("b.css");

        fs::write(&src, "a").unwrap();
        assert!(!is_up_to_date(&src, &dst));

        fs::write(&dst, "a").unwrap();
        let later = SystemTime::now() + Duration::from_secs(60);
        fs::File::options()
            .write(true)
            .open(&dst)
            .unwrap()
            .set_modified(later)
            .unwrap();
        assert!(is_up_to_date(&src, &dst));

        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(later + Duration::from_secs(60))
            .unwrap();
        assert!(!is_up_to_date(&src, &dst));
    }
}
