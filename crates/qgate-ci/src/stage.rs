//! Pipeline stage definitions and configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Builtin tool stages with fixed command lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStage {
    /// npx eslint .
    Lint,

    /// npm audit --audit-level=high
    Audit,
}

impl BuiltinStage {
    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinStage::Lint => "eslint",
            BuiltinStage::Audit => "npm_audit",
        }
    }

    /// Human-readable label used for the log group.
    pub fn label(&self) -> &'static str {
        match self {
            BuiltinStage::Lint => "Running ESLint",
            BuiltinStage::Audit => "Running npm audit",
        }
    }

    /// Get the stage's command.
    pub fn command(&self) -> Vec<String> {
        match self {
            BuiltinStage::Lint => {
                vec!["npx".to_string(), "eslint".to_string(), ".".to_string()]
            }
            BuiltinStage::Audit => {
                vec![
                    "npm".to_string(),
                    "audit".to_string(),
                    "--audit-level=high".to_string(),
                ]
            }
        }
    }
}

/// Configuration for a pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage name.
    pub name: String,

    /// Human-readable label for the log group.
    pub label: String,

    /// Command to execute (first element is the executable).
    pub command: Vec<String>,

    /// Working directory for the command.
    pub cwd: PathBuf,

    /// Treat any stderr output as failure.
    pub fail_on_stderr: bool,
}

impl StageConfig {
    /// Create a stage configuration from a builtin stage.
    ///
    /// Builtin tools run with the stderr-is-failure policy.
    pub fn from_builtin(stage: BuiltinStage, cwd: &Path) -> Self {
        Self {
            name: stage.name().to_string(),
            label: stage.label().to_string(),
            command: stage.command(),
            cwd: cwd.to_path_buf(),
            fail_on_stderr: true,
        }
    }

    /// Create a custom stage from a configured command string.
    ///
    /// The string is split shell-style; an empty or unparsable
    /// command is rejected.
    pub fn custom(name: &str, label: &str, command_line: &str, cwd: &Path) -> Result<Self> {
        let command = shell_words::split(command_line)
            .map_err(|_| PipelineError::EmptyCommand(name.to_string()))?;
        if command.is_empty() {
            return Err(PipelineError::EmptyCommand(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            label: label.to_string(),
            command,
            cwd: cwd.to_path_buf(),
            fail_on_stderr: false,
        })
    }

    /// Append extra arguments to the command.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.extend(args.into_iter().map(Into::into));
        self
    }
}
