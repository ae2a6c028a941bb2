//! Stage execution.

use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use crate::error::{PipelineError, Result};
use crate::stage::StageConfig;

/// Result of a stage execution.
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// Stage name.
    pub stage_name: String,

    /// Exit code (0 = success).
    pub exit_code: i32,

    /// Captured stdout, chunks in arrival order.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the process exited successfully.
    pub success: bool,
}

impl StageOutput {
    /// Whether this stage passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }

    /// Enforce the stage's failure contract.
    ///
    /// Non-zero exit is always fatal; with `fail_on_stderr`, any
    /// stderr output is fatal as well.
    pub fn ensure_passed(&self, fail_on_stderr: bool) -> Result<()> {
        if !self.passed() {
            return Err(PipelineError::StageFailed {
                stage: self.stage_name.clone(),
                exit_code: self.exit_code,
            });
        }
        if fail_on_stderr && !self.stderr.trim().is_empty() {
            return Err(PipelineError::StderrOutput {
                stage: self.stage_name.clone(),
            });
        }
        Ok(())
    }
}

/// Stage runner that executes one external command at a time.
pub struct StageRunner;

impl StageRunner {
    /// Execute a single stage and return its captured output.
    ///
    /// Blocks until the child exits; there is no timeout, a hanging
    /// tool hangs the run.
    pub async fn execute(config: &StageConfig) -> Result<StageOutput> {
        let start = Instant::now();

        if config.command.is_empty() {
            return Err(PipelineError::EmptyCommand(config.name.clone()));
        }

        let exe = &config.command[0];
        let args = &config.command[1..];

        let child = Command::new(exe)
            .args(args)
            .current_dir(&config.cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PipelineError::Spawn {
                stage: config.name.clone(),
                source,
            })?;

        let output = child.wait_with_output().await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let success = output.status.success();

        Ok(StageOutput {
            stage_name: config.name.clone(),
            exit_code,
            stdout,
            stderr,
            duration_ms,
            success,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn echo_stage(message: &str) -> StageConfig {
        StageConfig::custom(
            "echo_test",
            "Running echo",
            &format!("echo {message}"),
            Path::new("."),
        )
        .expect("command should parse")
    }

    #[tokio::test]
    async fn test_execute_captures_stdout() {
        let result = StageRunner::execute(&echo_stage("hello"))
            .await
            .expect("execute failed");
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let config = StageConfig::custom("false_test", "Running false", "false", Path::new("."))
            .expect("command should parse");

        let result = StageRunner::execute(&config).await.expect("execute failed");
        assert!(!result.success);
        assert_ne!(result.exit_code, 0);
        assert!(result.ensure_passed(false).is_err());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_fatal() {
        let config = StageConfig::custom(
            "missing_tool",
            "Running missing tool",
            "/nonexistent-binary-that-does-not-exist",
            Path::new("."),
        )
        .expect("command should parse");

        let err = StageRunner::execute(&config).await.unwrap_err();
        assert!(err.to_string().contains("Failed to start missing_tool"));
    }

    #[tokio::test]
    async fn test_stderr_policy() {
        let config = StageConfig::custom(
            "stderr_test",
            "Running stderr test",
            "sh -c 'echo warning >&2'",
            Path::new("."),
        )
        .expect("command should parse");

        let result = StageRunner::execute(&config).await.expect("execute failed");
        // Exit code is 0, so only the stderr policy can reject it.
        assert!(result.ensure_passed(false).is_ok());
        let err = result.ensure_passed(true).unwrap_err();
        assert_eq!(err.to_string(), "Stage stderr_test wrote to stderr");
    }
}
