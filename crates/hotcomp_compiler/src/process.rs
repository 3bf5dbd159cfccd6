//! Compiler backed by an external command.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::{CompileError, CompileOptions, CompiledArtifact, Compiler};

/// Environment variable carrying the request path of the file being compiled.
pub const PATH_ENV: &str = "HOTCOMP_PATH";

/// Environment variable carrying the JSON-encoded `CompileOptions`.
pub const OPTIONS_ENV: &str = "HOTCOMP_OPTIONS";

/// Runs an external command for every compilation.
///
/// The source is written to the command's stdin and its stdout becomes the
/// compiled code. A non-zero exit status is a compile failure; stderr lines
/// starting with `warning:` are collected as artifact warnings.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    program: String,
    args: Vec<String>,
}

impl ProcessCompiler {
    /// Creates a compiler that runs `program` with `args`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a compiler from a whitespace-separated command line.
    pub fn from_command_line(command: &str) -> Result<Self, CompileError> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| CompileError::Spawn("empty compiler command".to_string()))?;
        Ok(Self::new(program, parts))
    }

    /// Returns the program that is run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the program arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

fn collect_warnings(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter_map(|line| line.strip_prefix("warning:"))
        .map(|warning| warning.trim().to_string())
        .collect()
}

impl Compiler for ProcessCompiler {
    fn name(&self) -> &str {
        &self.program
    }

    async fn compile(
        &self,
        path: &str,
        source: &str,
        options: &CompileOptions,
    ) -> Result<CompiledArtifact, CompileError> {
        let options_json = serde_json::to_string(options)
            .map_err(|e| CompileError::internal(format!("Failed to encode options: {}", e)))?;

        debug!("Running {} for {}", self.program, path);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(PATH_ENV, path)
            .env(OPTIONS_ENV, options_json)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CompileError::Spawn(format!("{}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CompileError::internal("Compiler stdin was not captured"))?;

        // Feed stdin concurrently so a compiler that writes before it has read
        // all of its input cannot deadlock on a full stdout pipe.
        let input = source.to_owned();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CompileError::internal(format!("Failed to wait for compiler: {}", e)))?;

        match writer.await {
            Ok(Ok(())) => {}
            // The compiler may legitimately exit without reading all input.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => {
                return Err(CompileError::internal(format!(
                    "Failed to write compiler input: {}",
                    e
                )));
            }
            Err(e) => {
                return Err(CompileError::internal(format!(
                    "Compiler input task failed: {}",
                    e
                )));
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = match stderr.trim() {
                "" => format!("{} exited with {}", self.program, output.status),
                trimmed => trimmed.to_string(),
            };
            return Err(CompileError::failed(path, message));
        }

        let code = String::from_utf8(output.stdout).map_err(|e| {
            CompileError::failed(path, format!("Compiler produced invalid UTF-8: {}", e))
        })?;

        Ok(CompiledArtifact::new(code, source).with_warnings(collect_warnings(&stderr)))
    }
}
