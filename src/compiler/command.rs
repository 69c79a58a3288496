//! External process compiler.
//!
//! Runs a configured command, pipes the batch buffer to its stdin and reads
//! CSS from stdout. Mirrors the stdin-piping path of a blocking command
//! runner, but on `tokio::process` so the flush can await it.

use super::{CompileError, RenderOptions, Rendered, StyleCompiler};
use regex::Regex;
use std::{process::Stdio, sync::OnceLock};
use tokio::{io::AsyncWriteExt, process::Command};

/// Flag used to pass import search paths (`lessc --include-path=a:b`).
const INCLUDE_PATH_FLAG: &str = "--include-path=";

/// Stderr prefixes that carry no information for the user.
const SKIP_PREFIXES: &[&str] = &["npm WARN", "(node:"];

/// Compiler backed by an external command such as `["lessc", "-"]`.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    /// Create from a command array. Returns `None` for an empty array.
    pub fn from_slice(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Full argument list for one render.
    fn build_args(&self, options: &RenderOptions) -> Vec<String> {
        let mut args = self.args.clone();
        if !options.include_paths.is_empty()
            && let Ok(joined) = std::env::join_paths(&options.include_paths)
        {
            args.push(format!("{INCLUDE_PATH_FLAG}{}", joined.to_string_lossy()));
        }
        args
    }
}

impl StyleCompiler for CommandCompiler {
    fn name(&self) -> &str {
        &self.program
    }

    async fn render(
        &self,
        source: &str,
        options: &RenderOptions,
    ) -> Result<Rendered, CompileError> {
        let command = self.program.clone();
        let args = self.build_args(options);
        crate::debug!("batch"; "running `{} {}`", command, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CompileError::Spawn {
                command: command.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| CompileError::Io {
            command: command.clone(),
            source: std::io::Error::other("stdin was not captured"),
        })?;

        // Feed stdin while the child drains into stdout, so large batches
        // cannot deadlock on a full pipe.
        let feed = async move {
            let result = stdin.write_all(source.as_bytes()).await;
            drop(stdin);
            result
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|source| CompileError::Io {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(CompileError::Failed {
                command,
                status: output.status,
                stderr: clean_stderr(&output.stderr),
            });
        }

        // A broken pipe only matters if the command also failed.
        if let Err(e) = written {
            crate::debug!("batch"; "stdin write to `{}` ended early: {}", command, e);
        }

        let css = String::from_utf8(output.stdout).map_err(|_| CompileError::Encoding { command })?;
        Ok(Rendered { css })
    }
}

/// Strip ANSI escape codes, blank lines and known noise from stderr.
fn clean_stderr(raw: &[u8]) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

    let text = String::from_utf8_lossy(raw);
    text.lines()
        .map(|line| re.replace_all(line, ""))
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !SKIP_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn lessc() -> CommandCompiler {
        CommandCompiler::from_slice(&["lessc".into(), "-".into()]).unwrap()
    }

    #[test]
    fn test_from_slice_empty() {
        assert!(CommandCompiler::from_slice(&[]).is_none());
    }

    #[test]
    fn test_build_args_plain() {
        let args = lessc().build_args(&RenderOptions::default());
        assert_eq!(args, vec!["-"]);
    }

    #[test]
    fn test_build_args_include_paths() {
        let options = RenderOptions {
            include_paths: vec![PathBuf::from("a"), PathBuf::from("b")],
        };
        let args = lessc().build_args(&options);
        let sep = if cfg!(windows) { ";" } else { ":" };
        assert_eq!(
            args,
            vec!["-".to_string(), format!("--include-path=a{sep}b")]
        );
    }

    #[test]
    fn test_clean_stderr() {
        let raw = b"\x1b[31mParseError\x1b[0m: bad\n\nnpm WARN config\n  in - on line 3";
        assert_eq!(clean_stderr(raw), "ParseError: bad\n  in - on line 3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_through_cat() {
        let cat = CommandCompiler::from_slice(&["cat".into()]).unwrap();
        let rendered = cat.render("a { b: c }", &RenderOptions::default()).await.unwrap();
        assert_eq!(rendered.css, "a { b: c }");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_failure_status() {
        let sh = CommandCompiler::from_slice(&[
            "sh".into(),
            "-c".into(),
            "cat >/dev/null; echo boom >&2; exit 3".into(),
        ])
        .unwrap();
        let err = sh.render("x", &RenderOptions::default()).await.unwrap_err();
        match err {
            CompileError::Failed { command, stderr, .. } => {
                assert_eq!(command, "sh");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_render_missing_program() {
        let missing =
            CommandCompiler::from_slice(&["tola-assets-no-such-compiler".into()]).unwrap();
        let err = missing.render("x", &RenderOptions::default()).await.unwrap_err();
        assert!(matches!(err, CompileError::Spawn { .. }));
    }
}
