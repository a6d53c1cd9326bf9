use async_trait::async_trait;
use std::io;
use std::sync::{Arc, Mutex};

use reelcut::{CommandOutput, ProcessRunner};

/// Records every command. Calls before `fail_from` succeed and write the last
/// argv entry as an output file; later calls exit with `exit_code`.
#[derive(Clone)]
pub struct MockProcessRunner {
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
    pub fail_from: usize,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_from: usize::MAX,
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

impl MockProcessRunner {
    pub fn failing(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Self::failing_from(0, exit_code, stdout, stderr)
    }

    /// Succeed for the first `call` commands, then fail
    pub fn failing_from(call: usize, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            fail_from: call,
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: &[String]) -> io::Result<CommandOutput> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(command.to_vec());
            calls.len() - 1
        };

        if index >= self.fail_from {
            return Ok(CommandOutput {
                exit_code: self.exit_code,
                stdout: self.stdout.clone(),
                stderr: self.stderr.clone(),
            });
        }

        if let Some(target) = command.last().filter(|t| t.ends_with(".mp4")) {
            let target = std::path::Path::new(target);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, b"fake media")?;
        }

        Ok(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
