//! Stylesheet compiler seam.
//!
//! The batch transform only needs "text in, CSS out". Anything that can do
//! that implements [`StyleCompiler`]:
//!
//! | Implementation      | Backend                                  |
//! |---------------------|------------------------------------------|
//! | [`CommandCompiler`] | external process (`lessc -` by default)  |
//! | test fakes          | in-process closures over `&str`          |
//!
//! A compiler is invoked once per batch, never per file.

mod command;

pub use command::CommandCompiler;

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Options forwarded to the compiler for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Directories searched when resolving `@import`.
    pub include_paths: Vec<PathBuf>,
}

/// Successful compiler output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub css: String,
}

/// Compiler invocation failure.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running `{command}`")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}\n{stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{command}` produced output that is not valid UTF-8")]
    Encoding { command: String },
}

/// A stylesheet preprocessor that turns one source buffer into CSS.
pub trait StyleCompiler {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Compile `source` to CSS.
    async fn render(&self, source: &str, options: &RenderOptions)
    -> Result<Rendered, CompileError>;
}
