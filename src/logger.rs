//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` for output that only appears with `--verbose`
//! - `StepStatus` for the one-line summary printed after each build step
//!
//! # Example
//!
//! ```ignore
//! log!("styles"; "compiling {} units", count);
//! debug!("rebase"; "{} -> {}", from, to);
//! logger::status_success("styles: 12 units -> dist/styles/css/style.min.css");
//! ```

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream};
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    // Serialize with step status output so lines never interleave
    let _guard = STEP_STATUS.lock();
    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type.
///
/// Honors `--color` and whether stdout is a terminal.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let paint: fn(&String) -> String = match module_lower {
        "serve" => |p| p.bright_blue().bold().to_string(),
        "copy" => |p| p.bright_green().bold().to_string(),
        "styles" | "batch" => |p| p.bright_magenta().bold().to_string(),
        "error" => |p| p.bright_red().bold().to_string(),
        _ => |p| p.bright_yellow().bold().to_string(),
    };
    format!("[{module}]")
        .if_supports_color(Stream::Stdout, paint)
        .to_string()
}

// ============================================================================
// Step Status
// ============================================================================

/// Summary line printed when a build step finishes.
///
/// Each line carries the elapsed time since the process started, so
/// parallel steps can be told apart in the output.
pub struct StepStatus {
    started: Instant,
}

static STEP_STATUS: LazyLock<Mutex<StepStatus>> = LazyLock::new(|| Mutex::new(StepStatus::new()));

impl StepStatus {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Display success message (✓ prefix, green).
    pub fn success(&self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Display error message (✗ prefix, red) with optional detail.
    pub fn error(&self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(format!("{}", "✗".red()), &message);
    }

    fn display(&self, symbol: String, message: &str) {
        let elapsed = format!("[{:>6.2}s]", self.started.elapsed().as_secs_f64())
            .dimmed()
            .to_string();
        let mut stdout = stdout().lock();
        writeln!(stdout, "{elapsed} {symbol} {message}").ok();
        stdout.flush().ok();
    }
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Global step status: success
pub fn status_success(message: &str) {
    STEP_STATUS.lock().success(message);
}

/// Global step status: error
pub fn status_error(summary: &str, detail: &str) {
    STEP_STATUS.lock().error(summary, detail);
}

// ============================================================================
// Tests
// ============================================================================
