//! Child processes run inside the workspace: python files, shell lines, git clone

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::ServiceError;
use crate::workspace::PathGuard;

const MAX_OUTPUT: usize = 10000;

/// Runs external programs with the workspace as working directory
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    guard: PathGuard,
    timeout: Duration,
}

/// Captured result of one child process
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl ProcessRunner {
    pub fn new(workspace: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            guard: PathGuard::new(workspace),
            timeout,
        }
    }

    pub fn with_workspace(workspace: impl Into<PathBuf>) -> Self {
        Self::new(workspace, Duration::from_secs(60))
    }

    pub fn workspace(&self) -> &Path {
        self.guard.root()
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<ProcessOutput, ServiceError> {
        debug!("◆ Spawning {} {:?}", program, args);
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(self.guard.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ServiceError::Failed(format!(
                    "could not start {}: {}",
                    program, e
                )))
            }
            Err(_) => {
                return Err(ServiceError::Failed(format!(
                    "{} timed out after {} seconds",
                    program,
                    self.timeout.as_secs()
                )))
            }
        };

        Ok(ProcessOutput {
            stdout: truncate(String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: truncate(String::from_utf8_lossy(&output.stderr).to_string()),
            exit_code: output.status.code(),
        })
    }

    /// Run a `.py` file from the workspace with `python3`
    pub async fn execute_python_file(&self, file: &str) -> Result<String, ServiceError> {
        if !file.ends_with(".py") {
            return Err(ServiceError::Failed(
                "Invalid file type. Only .py files are allowed.".to_string(),
            ));
        }
        let path = self.guard.resolve(file).await?;
        if !path.is_file() {
            return Err(ServiceError::Failed(format!(
                "File '{}' does not exist.",
                file
            )));
        }

        let path_arg = path.to_string_lossy().to_string();
        let output = self.run("python3", &[&path_arg]).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Ok(format!("{}\n{}", output.stdout, output.stderr)
                .trim()
                .to_string())
        }
    }

    /// Non-interactive shell line through `sh -c`
    pub async fn execute_shell(&self, command_line: &str) -> Result<String, ServiceError> {
        let output = self.run("sh", &["-c", command_line]).await?;
        Ok(format!(
            "STDOUT:\n{}\nSTDERR:\n{}",
            output.stdout, output.stderr
        ))
    }

    /// `git clone` into a workspace-confined directory
    pub async fn clone_repository(
        &self,
        repository_url: &str,
        clone_path: &str,
    ) -> Result<String, ServiceError> {
        let target = self.guard.resolve(clone_path).await?;
        let target_arg = target.to_string_lossy().to_string();
        let output = self
            .run("git", &["clone", "--", repository_url, &target_arg])
            .await?;
        if output.success() {
            Ok(format!("Cloned {} to {}", repository_url, clone_path))
        } else {
            Err(ServiceError::Failed(output.stderr.trim().to_string()))
        }
    }
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_OUTPUT {
        let mut cut = MAX_OUTPUT;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        let remaining = text.len() - cut;
        text.truncate(cut);
        text.push_str(&format!("\n... output truncated: {} bytes remaining", remaining));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_execute_shell_captures_both_streams() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::with_workspace(dir.path());
        let result = runner
            .execute_shell("echo hello; echo oops >&2")
            .await
            .unwrap();
        assert!(result.starts_with("STDOUT:\nhello\n"));
        assert!(result.contains("STDERR:\noops"));
    }

    #[tokio::test]
    async fn test_execute_shell_runs_in_workspace() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::with_workspace(dir.path());
        let result = runner.execute_shell("pwd").await.unwrap();
        assert!(result.contains(runner.workspace().to_str().unwrap()));
    }

    #[tokio::test]
    async fn test_python_file_requires_py_extension() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::with_workspace(dir.path());
        let err = runner.execute_python_file("script.sh").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid file type. Only .py files are allowed.");
    }

    #[tokio::test]
    async fn test_python_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::with_workspace(dir.path());
        let err = runner.execute_python_file("missing.py").await.unwrap_err();
        assert_eq!(err.to_string(), "File 'missing.py' does not exist.");
    }

    #[tokio::test]
    async fn test_clone_path_outside_workspace_rejected() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::with_workspace(dir.path());
        let err = runner
            .clone_repository("https://example.com/repo.git", "../escape")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is outside workspace"));
    }

    #[tokio::test]
    async fn test_timeout_reported() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new(dir.path(), Duration::from_millis(100));
        let err = runner.execute_shell("sleep 5").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_truncate_long_output() {
        let long = "x".repeat(MAX_OUTPUT + 5);
        let out = truncate(long);
        assert!(out.ends_with("5 bytes remaining"));
    }
}
