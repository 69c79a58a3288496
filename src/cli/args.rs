//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Front-end asset build pipeline
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: assets.toml)
    #[arg(short = 'C', long, default_value = "assets.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Copy static files, then build the stylesheet bundle
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build the stylesheet bundle only
    Styles {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Run the static copy rules only
    Copy {
        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },

    /// Build, then serve the output directory
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Shared arguments for commands that run the stylesheet pipeline
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Minify the stylesheet bundle
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether the command runs the stylesheet compiler.
    pub const fn runs_styles(&self) -> bool {
        !matches!(self.command, Commands::Copy { .. })
    }

    pub const fn verbose(&self) -> bool {
        match &self.command {
            Commands::Build { build_args }
            | Commands::Styles { build_args }
            | Commands::Serve { build_args, .. } => build_args.verbose,
            Commands::Copy { verbose } => *verbose,
        }
    }
}
