//! Command runner abstraction for external queries.
//!
//! `CommandRunner` is the trait probes use to execute system commands.
//! `ShellRunner` is the production implementation that spawns `sh -c` in a
//! given working directory. `MockRunner` is the test double that records
//! calls and returns preset responses.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

/// Trait for executing shell command strings inside a directory.
pub trait CommandRunner: Send + Sync {
    fn run(&self, cmd: &str, dir: &Path) -> Result<String, String>;
}

/// Production runner that spawns `sh -c <cmd>` with `dir` as its cwd.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, cmd: &str, dir: &Path) -> Result<String, String> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .current_dir(dir)
            .output()
            .map_err(|e| format!("Failed to execute in {}: {}", dir.display(), e))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!("{} ({})", stderr.trim(), output.status))
        }
    }
}

/// Test-double runner that records commands and returns pre-configured responses.
pub struct MockRunner {
    responses: Mutex<Vec<Result<String, String>>>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl MockRunner {
    pub fn with_responses(responses: Vec<Result<String, String>>) -> Self {
        let mut reversed = responses;
        reversed.reverse();
        MockRunner {
            responses: Mutex::new(reversed),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Commands run so far, paired with their working directory.
    pub fn executed_commands(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &str, dir: &Path) -> Result<String, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((cmd.to_string(), dir.to_path_buf()));
        }
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| "mock runner poisoned".to_string())?;
        responses.pop().unwrap_or_else(|| Ok(String::new()))
    }
}
