//! Build orchestration.
//!
//! Build steps:
//! - **Copy** - apply `[[build.copy]]` rules (rayon, mtime-skipping)
//! - **Styles** - scan, batch-compile, rebase, prefix, minify, concat
//!
//! `build` runs both steps in parallel with `rayon::join`; the styles step
//! drives its async flush on a small tokio runtime.

use crate::{
    asset::{CopyReport, run_copy, scan_styles},
    compiler::{CommandCompiler, RenderOptions},
    config::{CompilerConfig, ProjectConfig},
    log, logger,
    pipeline::{
        Stages, Unit, concat, run_styles,
        transform::{Minifier, Prefixer, UrlRebase},
        write_bundle,
    },
    utils::plural::plural_count,
};
use anyhow::{Context, Result, anyhow};
use std::{path::PathBuf, sync::Arc};

/// Run copy and styles in parallel; both errors are reported.
pub fn build_all(config: &ProjectConfig) -> Result<()> {
    let (copied, styled) = rayon::join(|| copy_step(config), || styles_step(config));

    match (copied, styled) {
        (Ok(_), Ok(_)) => Ok(()),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(copy), Err(styles)) => {
            log!("error"; "copy: {:#}", copy);
            Err(styles)
        }
    }
}

/// Apply the copy rules.
pub fn copy_step(config: &ProjectConfig) -> Result<CopyReport> {
    let rules = config.build.copy_rules();
    let result = run_copy(&rules, &config.build.output, false);

    match &result {
        Ok(report) => logger::status_success(&format!(
            "copy: {} ({} up to date)",
            plural_count(report.copied, "file"),
            report.fresh
        )),
        Err(e) => logger::status_error("copy failed", &format!("{e:#}")),
    }
    result
}

/// Build the stylesheet bundle.
///
/// Returns the bundle path, or `None` when there is nothing to bundle.
pub fn styles_step(config: &ProjectConfig) -> Result<Option<PathBuf>> {
    let result = build_styles(config);

    match &result {
        Ok(Some(path)) => logger::status_success(&format!(
            "styles: {}",
            config.root_relative(path).display()
        )),
        Ok(None) => {}
        Err(e) => logger::status_error("styles failed", &format!("{e:#}")),
    }
    result
}

fn build_styles(config: &ProjectConfig) -> Result<Option<PathBuf>> {
    let styles = &config.build.styles;

    let files = scan_styles(styles, &config.root)?;
    if files.is_empty() {
        log!("styles"; "no stylesheets matched, skipping");
        return Ok(None);
    }

    let units = files
        .iter()
        .map(|path| Unit::read(path))
        .collect::<Result<Vec<_>>>()?;
    let count = units.len();

    let compiler = CommandCompiler::from_slice(&styles.compiler.command)
        .ok_or_else(|| anyhow!("build.styles.compiler.command is empty"))?;
    let options = RenderOptions {
        include_paths: include_paths(&styles.compiler, &units),
    };
    let stages = Arc::new(build_stages(config)?);
    crate::debug!("styles"; "stages: {}", stages.names().join(" -> "));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let compiled_ext = &styles.compiler;
    let units = rt.block_on(run_styles(
        units,
        |unit| compiled_ext.compiles(unit.extension().as_deref()),
        &compiler,
        &options,
        stages,
    ))?;

    log!("styles"; "{} bundled", plural_count(count, "stylesheet"));
    let bundle = concat(&units);
    let path = write_bundle(&config.build.styles_dir(), &styles.filename, &bundle)?;
    Ok(Some(path))
}

/// Configured include paths followed by the directory of every compiled unit.
///
/// The batch reaches the compiler on stdin, so relative `@import`s would
/// otherwise resolve against the working directory.
fn include_paths(compiler: &CompilerConfig, units: &[Unit]) -> Vec<PathBuf> {
    let mut paths = compiler.include_paths.clone();
    let dirs = units
        .iter()
        .filter(|unit| compiler.compiles(unit.extension().as_deref()))
        .filter_map(|unit| unit.path.parent())
        .filter(|dir| !dir.as_os_str().is_empty());
    for dir in dirs {
        if !paths.iter().any(|p| p == dir) {
            paths.push(dir.to_path_buf());
        }
    }
    paths
}

/// Map stages in their fixed order: rebase, prefix, minify.
fn build_stages(config: &ProjectConfig) -> Result<Stages> {
    let styles = &config.build.styles;
    let prefixer = Prefixer::from_queries(&styles.browsers).map_err(|e| anyhow!(e))?;
    let minifier = Minifier::new(prefixer.targets());

    Ok(Stages::new()
        .pipe_if(
            styles.rebase.enable,
            UrlRebase::new(styles.rebase.fonts.clone(), styles.rebase.images.clone()),
        )
        .pipe(prefixer)
        .pipe_if(config.build.minify, minifier))
}
