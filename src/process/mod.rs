use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::Command;

/// Marker substituted for every newline in captured output and summaries.
///
/// Results are embedded directly into rendered pages, so the substitution is
/// part of the runner's contract rather than a view concern.
pub const HTML_LINE_BREAK: &str = "<br>\n";

/// Replace each `\n` with [`HTML_LINE_BREAK`]
pub fn html_line_breaks(text: &str) -> String {
    text.replace('\n', HTML_LINE_BREAK)
}

/// Render an argv the way it shows up in logs and failure pages
pub fn describe(command: &[String]) -> String {
    format!("{:?}", command)
}

/// Everything a finished process reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status, `-1` when the process was terminated by a signal
    pub exit_code: i32,

    /// Captured stdout with line breaks substituted
    pub stdout: String,

    /// Captured stderr with line breaks substituted
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs to completion.
///
/// A non-zero exit is reported through [`CommandOutput::exit_code`], never as
/// an error; only failing to start the program at all is an `Err`. There is no
/// timeout: the call waits as long as the program runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &[String]) -> io::Result<CommandOutput>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for CommandRunner {
    async fn run(&self, command: &[String]) -> io::Result<CommandOutput> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

        tracing::info!("Running: {}", describe(command));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .inspect_err(|e| tracing::error!(error = %e, program = %program, "Failed to start command"))?;

        let exit_code = output.status.code().unwrap_or(-1);
        tracing::info!("Completed running {} with exit code {}", program, exit_code);

        Ok(CommandOutput {
            exit_code,
            stdout: html_line_breaks(&String::from_utf8_lossy(&output.stdout)),
            stderr: html_line_breaks(&String::from_utf8_lossy(&output.stderr)),
        })
    }
}
