//! Unit-test execution and coverage extraction.
//!
//! The unit-test stage runs the configured command with coverage
//! reporters enabled, then reads the statement-coverage percentage
//! from `<path>/coverage/coverage-summary.json`. A missing summary
//! file is fatal, never silently defaulted.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::runner::StageRunner;
use crate::stage::StageConfig;

/// Reporter flags passed to the unit-test command.
pub const COVERAGE_REPORTER_FLAGS: [&str; 3] = [
    "--coverageReporters=json-summary",
    "--coverageReporters=text",
    "--coverageReporters=html",
];

/// Report text used when the unit-test phase is disabled.
pub const NO_COVERAGE_MESSAGE: &str = "No coverage check requested";

/// Statement coverage for one run.
///
/// `NotRequested` is a caller-visible policy distinguishing "the
/// phase did not run" from "the phase ran with 0% coverage".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Coverage {
    #[default]
    NotRequested,
    Measured(f64),
}

impl Coverage {
    /// The measured percentage, if the phase ran.
    pub fn as_measured(&self) -> Option<f64> {
        match self {
            Coverage::NotRequested => None,
            Coverage::Measured(pct) => Some(*pct),
        }
    }
}

/// Shape of the coverage summary artifact:
/// `{ total: { statements: { pct: number } } }`.
#[derive(Debug, Deserialize)]
pub struct CoverageSummary {
    pub total: CoverageTotals,
}

#[derive(Debug, Deserialize)]
pub struct CoverageTotals {
    pub statements: CoverageMetric,
}

#[derive(Debug, Deserialize)]
pub struct CoverageMetric {
    pub pct: f64,
}

/// Location of the coverage summary under the target path.
pub fn summary_path(path: &Path) -> PathBuf {
    path.join("coverage").join("coverage-summary.json")
}

/// Read the statement-coverage percentage from the summary file.
pub async fn read_summary(path: &Path) -> Result<f64> {
    let file = summary_path(path);
    let raw = tokio::fs::read_to_string(&file).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipelineError::CoverageFileMissing(file.clone())
        } else {
            PipelineError::Io(e)
        }
    })?;
    let summary: CoverageSummary = serde_json::from_str(&raw)?;
    Ok(summary.total.statements.pct)
}

/// Run the configured unit-test command with coverage reporters and
/// extract the statement-coverage percentage.
///
/// Returns the coverage and the captured stdout.
pub async fn run_unit_tests(path: &Path, command: &str) -> Result<(Coverage, String)> {
    tokio::fs::create_dir_all(path.join("coverage")).await?;

    let config = StageConfig::custom("unit_tests", "Running tests", command, path)?
        .with_args(COVERAGE_REPORTER_FLAGS);
    let output = StageRunner::execute(&config).await?;
    output.ensure_passed(config.fail_on_stderr)?;

    let pct = read_summary(path).await?;
    info!("Detected coverage: {pct}%");

    Ok((Coverage::Measured(pct), output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_path() {
        assert_eq!(
            summary_path(Path::new("./web")),
            PathBuf::from("./web/coverage/coverage-summary.json")
        );
    }

    #[test]
    fn test_summary_parses_statement_pct() {
        let raw = r#"{
            "total": {
                "lines": { "total": 10, "covered": 9, "skipped": 0, "pct": 90 },
                "statements": { "total": 12, "covered": 10, "skipped": 0, "pct": 83.33 },
                "functions": { "total": 4, "covered": 4, "skipped": 0, "pct": 100 },
                "branches": { "total": 2, "covered": 1, "skipped": 0, "pct": 50 }
            }
        }"#;
        let summary: CoverageSummary = serde_json::from_str(raw).expect("summary should parse");
        assert_eq!(summary.total.statements.pct, 83.33);
    }

    #[tokio::test]
    async fn test_missing_summary_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_summary(dir.path()).await.unwrap_err();
        assert!(err.to_string().starts_with("Coverage summary not found"));
    }

    #[tokio::test]
    async fn test_read_summary_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let coverage_dir = dir.path().join("coverage");
        std::fs::create_dir_all(&coverage_dir).unwrap();
        std::fs::write(
            coverage_dir.join("coverage-summary.json"),
            r#"{ "total": { "statements": { "pct": 85.5 } } }"#,
        )
        .unwrap();

        let pct = read_summary(dir.path()).await.expect("read failed");
        assert_eq!(pct, 85.5);
    }

    #[tokio::test]
    async fn test_malformed_summary_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let coverage_dir = dir.path().join("coverage");
        std::fs::create_dir_all(&coverage_dir).unwrap();
        std::fs::write(coverage_dir.join("coverage-summary.json"), "not json").unwrap();

        let err = read_summary(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("parse coverage summary"));
    }

    #[test]
    fn test_coverage_as_measured() {
        assert_eq!(Coverage::NotRequested.as_measured(), None);
        assert_eq!(Coverage::Measured(85.0).as_measured(), Some(85.0));
    }
}
