//! Static copy rules (side effects).
//!
//! ```text
//! src/client/
//! ├── favicon.ico        → dist/favicon.ico         (main rule, pattern "*")
//! ├── images/logo.png    → dist/images/logo.png     (images rule)
//! └── styles/site.less   ✗ excluded, bundled by the styles step
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, bail};
use glob::{MatchOptions, Pattern};
use jwalk::WalkDir;
use rayon::prelude::*;

use crate::config::CopyRule;
use crate::core::is_shutdown;
use crate::utils::path::is_up_to_date;

/// `*` stays within one directory, `**` crosses them.
const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Outcome of a copy run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    /// Files written.
    pub copied: usize,
    /// Files whose destination was already up to date.
    pub fresh: usize,
}

/// One planned file copy.
#[derive(Debug)]
struct CopyJob {
    source: PathBuf,
    dest: PathBuf,
}

/// A rule with its globs compiled.
struct CompiledRule<'a> {
    rule: &'a CopyRule,
    pattern: Pattern,
    exclude: Vec<Pattern>,
}

impl<'a> CompiledRule<'a> {
    fn new(rule: &'a CopyRule) -> Result<Self> {
        let pattern = Pattern::new(&rule.pattern)
            .with_context(|| format!("invalid copy pattern `{}`", rule.pattern))?;
        let exclude = rule
            .exclude
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude `{p}`")))
            .collect::<Result<_>>()?;
        Ok(Self {
            rule,
            pattern,
            exclude,
        })
    }

    /// Whether `rel` (relative to `from`) is selected by this rule.
    ///
    /// An exclude that matches a parent directory excludes everything below it.
    fn selects(&self, rel: &Path) -> bool {
        if !self.pattern.matches_path_with(rel, MATCH) {
            return false;
        }
        !rel.ancestors()
            .filter(|a| !a.as_os_str().is_empty())
            .any(|a| self.exclude.iter().any(|p| p.matches_path_with(a, MATCH)))
    }

    fn jobs(&self, output: &Path) -> Vec<CopyJob> {
        let from = &self.rule.from;
        if !from.is_dir() {
            return Vec::new();
        }
        let dest_root = output.join(&self.rule.to);

        let jobs: Vec<CopyJob> = WalkDir::new(from)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let source = e.path();
                let rel = source.strip_prefix(from).ok()?.to_path_buf();
                if !self.selects(&rel) {
                    return None;
                }
                let dest = if self.rule.flatten {
                    dest_root.join(rel.file_name()?)
                } else {
                    dest_root.join(&rel)
                };
                Some(CopyJob { source, dest })
            })
            .collect();
        crate::debug!("copy"; "{} selects {} file(s)", self.rule.label(), jobs.len());
        jobs
    }
}

/// Copy every file selected by `rules` into `output`.
///
/// Destinations at least as new as their source are left alone unless
/// `force` is set.
pub fn run_copy(rules: &[CopyRule], output: &Path, force: bool) -> Result<CopyReport> {
    let compiled = rules
        .iter()
        .map(CompiledRule::new)
        .collect::<Result<Vec<_>>>()?;

    let mut jobs: Vec<CopyJob> = compiled.iter().flat_map(|r| r.jobs(output)).collect();
    // Later rules win when two rules target the same destination
    jobs.reverse();
    let mut seen = rustc_hash::FxHashSet::default();
    jobs.retain(|job| seen.insert(job.dest.clone()));

    let copied = AtomicUsize::new(0);
    jobs.par_iter().try_for_each(|job| {
        if is_shutdown() {
            bail!("aborted");
        }
        if !force && is_up_to_date(&job.source, &job.dest) {
            return Ok(());
        }
        copy_file(job)?;
        copied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    })?;

    let copied = copied.into_inner();
    Ok(CopyReport {
        copied,
        fresh: jobs.len() - copied,
    })
}

fn copy_file(job: &CopyJob) -> Result<()> {
    if let Some(parent) = job.dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::copy(&job.source, &job.dest).with_context(|| {
        format!(
            "failed to copy {} -> {}",
            job.source.display(),
            job.dest.display()
        )
    })?;
    crate::debug!("copy"; "{}", job.dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn with_root(rules: Vec<CopyRule>, root: &Path) -> Vec<CopyRule> {
        rules
            .into_iter()
            .map(|r| CopyRule {
                from: root.join(&r.from),
                ..r
            })
            .collect()
    }

    #[test]
    fn test_default_rules() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "src/client/favicon.ico");
        touch(root, "src/client/robots.txt");
        touch(root, "src/client/styles/site.less");
        touch(root, "src/client/scripts/app.js");
        touch(root, "src/client/images/logo.png");
        touch(root, "src/client/images/nested/skip.png");
        touch(root, "src/client/fonts/icons.woff2");
        touch(root, "src/client/svg/arrow.svg");
        touch(root, "src/client/json/data.json");

        let out = root.join("dist");
        let report = run_copy(&with_root(CopyRule::defaults(), root), &out, false).unwrap();

        assert_eq!(report.copied, 6);
        assert!(out.join("favicon.ico").is_file());
        assert!(out.join("robots.txt").is_file());
        assert!(out.join("images/logo.png").is_file());
        assert!(out.join("fonts/icons.woff2").is_file());
        assert!(out.join("svg/arrow.svg").is_file());
        assert!(out.join("json/data.json").is_file());
        assert!(!out.join("styles").exists());
        assert!(!out.join("scripts").exists());
        assert!(!out.join("images/nested").exists());
    }

    #[test]
    fn test_second_run_skips_fresh_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "public/a.txt");
        touch(root, "public/deep/b.txt");

        let rules = vec![CopyRule {
            from: root.join("public"),
            ..CopyRule::default()
        }];
        let out = root.join("dist");

        let first = run_copy(&rules, &out, false).unwrap();
        assert_eq!(first, CopyReport { copied: 2, fresh: 0 });
        assert_eq!(fs::read_to_string(out.join("deep/b.txt")).unwrap(), "public/deep/b.txt");

        let second = run_copy(&rules, &out, false).unwrap();
        assert_eq!(second, CopyReport { copied: 0, fresh: 2 });

        let forced = run_copy(&rules, &out, true).unwrap();
        assert_eq!(forced.copied, 2);
    }

    #[test]
    fn test_flatten_and_exclude() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "vendor/pkg-a/fonts/a.woff2");
        touch(root, "vendor/pkg-b/dist/fonts/b.woff2");
        touch(root, "vendor/pkg-b/dist/fonts/b.ttf");
        touch(root, "vendor/legacy/old.woff2");

        let rules = vec![CopyRule {
            from: root.join("vendor"),
            to: PathBuf::from("fonts"),
            pattern: "**/*.woff2".into(),
            exclude: vec!["legacy".into()],
            flatten: true,
        }];
        let out = root.join("dist");
        let report = run_copy(&rules, &out, false).unwrap();

        assert_eq!(report.copied, 2);
        assert!(out.join("fonts/a.woff2").is_file());
        assert!(out.join("fonts/b.woff2").is_file());
        assert!(!out.join("fonts/b.ttf").exists());
        assert!(!out.join("fonts/old.woff2").exists());
    }

    #[test]
    fn test_missing_source_is_empty() {
        let dir = TempDir::new().unwrap();
        let rules = vec![CopyRule {
            from: dir.path().join("nope"),
            ..CopyRule::default()
        }];
        let report = run_copy(&rules, &dir.path().join("dist"), false).unwrap();
        assert_eq!(report, CopyReport::default());
    }

    #[test]
    fn test_invalid_pattern() {
        let rules = vec![CopyRule {
            pattern: "[".into(),
            ..CopyRule::default()
        }];
        assert!(run_copy(&rules, Path::new("/tmp/unused"), false).is_err());
    }

    #[test]
    fn test_selects_excluded_parent() {
        let rule = CopyRule {
            pattern: "**/*".into(),
            exclude: vec!["images".into()],
            ..CopyRule::default()
        };
        let compiled = CompiledRule::new(&rule).unwrap();
        assert!(compiled.selects(Path::new("favicon.ico")));
        assert!(compiled.selects(Path::new("docs/readme.txt")));
        assert!(!compiled.selects(Path::new("images/logo.png")));
        assert!(!compiled.selects(Path::new("images")));
    }
}
