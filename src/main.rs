//! tola-assets - front-end asset build pipeline.
//!
//! Copies static files and bundles stylesheets: LESS sources are compiled
//! in one batch, then every stylesheet is url-rebased, prefixed and
//! minified before concatenation.

mod asset;
mod cli;
mod compiler;
mod config;
mod core;
mod logger;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{
    Cli, Commands,
    build::{build_all, copy_step, styles_step},
};
use config::{ProjectConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose());

    let config = init_config(ProjectConfig::load(&cli)?);

    match &cli.command {
        Commands::Build { .. } => build_all(&config),
        Commands::Styles { .. } => styles_step(&config).map(|_| ()),
        Commands::Copy { .. } => copy_step(&config).map(|_| ()),
        Commands::Serve { .. } => {
            build_all(&config)?;
            cli::serve::serve_output()
        }
    }
}
