//! Error types for pipeline operations

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    #[error("Invalid input {name}: {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("Stage {0} has empty command")]
    EmptyCommand(String),

    #[error("Failed to start {stage}: {source}")]
    Spawn {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stage {stage} exited with code {exit_code}")]
    StageFailed { stage: String, exit_code: i32 },

    #[error("Stage {stage} wrote to stderr")]
    StderrOutput { stage: String },

    #[error("Coverage summary not found: {0}")]
    CoverageFileMissing(PathBuf),

    #[error("Failed to parse coverage summary: {0}")]
    CoverageParse(#[from] serde_json::Error),

    // f64 Display renders integral values without a fractional part,
    // so 10.0 reports as "10", matching the original message format.
    #[error("Coverage {coverage}% is below threshold {min}%")]
    BelowThreshold { coverage: f64, min: f64 },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
