//! Pipeline orchestration.
//!
//! Five sequential stages gated by independent flags: lint → audit →
//! unit tests (+ coverage gate) → integration tests → finalize. Only
//! finalization is unconditional: it renders the report and emits the
//! `coverage` and `report` outputs exactly once per run, on whatever
//! partial state exists when an earlier stage fails.

use std::path::Path;
use tracing::{error, info};

use crate::actions;
use crate::coverage::{self, Coverage, NO_COVERAGE_MESSAGE};
use crate::error::{PipelineError, Result};
use crate::gate::CoverageGate;
use crate::inputs::PipelineInputs;
use crate::report::render_markdown;
use crate::runner::StageRunner;
use crate::stage::{BuiltinStage, StageConfig};

/// Result state threaded through the stages.
///
/// Starts unset and is best-effort populated as stages complete, so
/// finalization always has something coherent to render.
#[derive(Debug, Default)]
struct RunState {
    coverage: Coverage,
    report: String,
    url: String,
    title: Option<String>,
}

/// Outcome of a complete pipeline run, handed to the binary.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Whether the run completed without a failure signal.
    pub success: bool,

    /// Measured coverage, if the unit-test phase ran.
    pub coverage: Option<f64>,

    /// The rendered markdown report.
    pub markdown: String,

    /// The reported failure message, if any.
    pub failure_message: Option<String>,
}

/// Pipeline orchestrator.
pub struct Pipeline;

impl Pipeline {
    /// Read inputs from the environment and run the full pipeline.
    ///
    /// Never returns an error: failures are reported through the
    /// failure signal and reflected in the outcome.
    pub async fn run() -> RunOutcome {
        Self::run_with(PipelineInputs::from_env()).await
    }

    /// Run the pipeline with pre-read inputs.
    ///
    /// Accepts the input-read result itself so a configuration error
    /// still flows through the guaranteed finalization step.
    pub async fn run_with(inputs: Result<PipelineInputs>) -> RunOutcome {
        let mut state = RunState::default();
        let result = Self::execute(inputs, &mut state).await;

        let failure_message = match result {
            Ok(()) => None,
            Err(err) => {
                let message = failure_message(&err);
                actions::set_failed(&message);
                Some(message)
            }
        };

        // Finalization: render and emit regardless of earlier failure.
        let title = state.title.as_deref().unwrap_or("Code Quality Report");
        let markdown =
            render_markdown(state.coverage.as_measured(), &state.url, &state.report, title);

        if let Err(err) = actions::write_summary(&markdown) {
            error!("Failed to write summary: {}", err);
        }
        let coverage_value = state
            .coverage
            .as_measured()
            .map(|pct| pct.to_string())
            .unwrap_or_default();
        if let Err(err) = actions::set_output("coverage", &coverage_value) {
            error!("Failed to set coverage output: {}", err);
        }
        if let Err(err) = actions::set_output("report", &markdown) {
            error!("Failed to set report output: {}", err);
        }

        RunOutcome {
            success: failure_message.is_none(),
            coverage: state.coverage.as_measured(),
            markdown,
            failure_message,
        }
    }

    /// Run the fallible stages in fixed order, populating `state` as
    /// results arrive. The first error aborts the remaining stages.
    async fn execute(inputs: Result<PipelineInputs>, state: &mut RunState) -> Result<()> {
        let inputs = inputs?;
        state.title = Some(inputs.report_title.clone());
        let path = inputs.relative_path.clone();

        if inputs.run_lint {
            Self::run_builtin(BuiltinStage::Lint, &path).await?;
        }

        if inputs.run_audit {
            Self::run_builtin(BuiltinStage::Audit, &path).await?;
        }

        match (&inputs.unit_test_command, inputs.min_coverage) {
            (Some(command), Some(min)) if inputs.run_unit_tests => {
                actions::start_group("Running tests");
                let (coverage, report) = coverage::run_unit_tests(&path, command).await?;
                actions::end_group();
                state.coverage = coverage;
                state.report = report;
                CoverageGate::evaluate(&state.coverage, min)?;
            }
            _ => {
                state.coverage = Coverage::NotRequested;
                state.report = NO_COVERAGE_MESSAGE.to_string();
            }
        }

        if inputs.run_integration_tests {
            if let (Some(command), Some(url)) = (&inputs.int_test_command, &inputs.service_url) {
                actions::start_group("Running integration tests");
                state.report = Self::run_integration_tests(&path, command).await?;
                actions::end_group();
                state.url = url.compose();
            }
        }

        Ok(())
    }

    /// Execute a builtin tool stage under its labeled log group.
    async fn run_builtin(stage: BuiltinStage, path: &Path) -> Result<()> {
        let config = StageConfig::from_builtin(stage, path);
        actions::start_group(&config.label);
        info!(stage = %config.name, "Executing stage");
        let output = StageRunner::execute(&config).await?;
        output.ensure_passed(config.fail_on_stderr)?;
        actions::end_group();
        Ok(())
    }

    /// Execute the configured integration-test command and return its
    /// captured stdout.
    async fn run_integration_tests(path: &Path, command: &str) -> Result<String> {
        let config =
            StageConfig::custom("integration_tests", "Running integration tests", command, path)?;
        info!(stage = %config.name, "Executing stage");
        let output = StageRunner::execute(&config).await?;
        output.ensure_passed(config.fail_on_stderr)?;
        Ok(output.stdout)
    }
}

/// Map a pipeline error to the reported failure message.
///
/// An error whose rendered message is empty is reported with a fixed
/// generic message instead.
pub fn failure_message(err: &PipelineError) -> String {
    let message = err.to_string();
    if message.is_empty() {
        "Unknown error occurred".to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::ServiceUrl;
    use std::path::PathBuf;

    fn disabled_inputs() -> PipelineInputs {
        PipelineInputs {
            relative_path: PathBuf::from("."),
            run_lint: false,
            run_audit: false,
            run_unit_tests: false,
            run_integration_tests: false,
            unit_test_command: None,
            int_test_command: None,
            min_coverage: None,
            report_title: "Code Quality Report".to_string(),
            service_url: None,
        }
    }

    #[tokio::test]
    async fn test_all_phases_disabled_yields_sentinel() {
        let _guard = crate::test_env::LOCK.lock().unwrap();
        let outcome = Pipeline::run_with(Ok(disabled_inputs())).await;
        assert!(outcome.success);
        assert_eq!(outcome.coverage, None);
        assert!(outcome.markdown.contains("No coverage check requested"));
        assert!(outcome.failure_message.is_none());
    }

    #[tokio::test]
    async fn test_missing_input_still_finalizes() {
        let _guard = crate::test_env::LOCK.lock().unwrap();
        let outcome = Pipeline::run_with(Err(PipelineError::MissingInput(
            "relativePath".to_string(),
        )))
        .await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.failure_message.as_deref(),
            Some("Input required and not supplied: relativePath")
        );
        // The report is still rendered from default state.
        assert!(outcome.markdown.contains("### Code Quality Report"));
        assert!(outcome.markdown.contains("No coverage report provided."));
    }

    #[tokio::test]
    async fn test_failed_stage_still_finalizes() {
        let _guard = crate::test_env::LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = disabled_inputs();
        inputs.run_unit_tests = true;
        inputs.unit_test_command = Some("false".to_string());
        inputs.min_coverage = Some(80.0);
        inputs.relative_path = dir.path().to_path_buf();

        let outcome = Pipeline::run_with(Ok(inputs)).await;
        assert!(!outcome.success);
        assert!(outcome
            .failure_message
            .as_deref()
            .unwrap()
            .contains("unit_tests"));
        assert!(outcome.markdown.contains("### Code Quality Report"));
    }

    #[tokio::test]
    async fn test_integration_output_overwrites_report_and_sets_url() {
        let _guard = crate::test_env::LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = disabled_inputs();
        inputs.relative_path = dir.path().to_path_buf();
        inputs.run_integration_tests = true;
        inputs.int_test_command = Some("echo done!".to_string());
        inputs.service_url = Some(ServiceUrl {
            prefix: "http://".to_string(),
            app_name: "myapp".to_string(),
            namespace: "default".to_string(),
            service_domain: "svc.cluster.local".to_string(),
            service_port: "8080".to_string(),
        });

        let outcome = Pipeline::run_with(Ok(inputs)).await;
        assert!(outcome.success, "failed: {:?}", outcome.failure_message);
        assert!(outcome.markdown.contains("```text\ndone!\n```"));
        assert!(outcome.markdown.contains(
            "Service URL [http://myapp.default.svc.cluster.local:8080](http://myapp.default.svc.cluster.local:8080)"
        ));
    }

    #[tokio::test]
    async fn test_coverage_below_threshold_message_verbatim() {
        let _guard = crate::test_env::LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let coverage_dir = dir.path().join("coverage");
        std::fs::create_dir_all(&coverage_dir).unwrap();
        std::fs::write(
            coverage_dir.join("coverage-summary.json"),
            r#"{ "total": { "statements": { "pct": 10 } } }"#,
        )
        .unwrap();

        let mut inputs = disabled_inputs();
        inputs.relative_path = dir.path().to_path_buf();
        inputs.run_unit_tests = true;
        inputs.unit_test_command = Some("echo done!".to_string());
        inputs.min_coverage = Some(80.0);

        let outcome = Pipeline::run_with(Ok(inputs)).await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.failure_message.as_deref(),
            Some("Coverage 10% is below threshold 80%")
        );
        // Coverage was measured before the gate fired, so it still renders.
        assert_eq!(outcome.coverage, Some(10.0));
        assert!(outcome.markdown.contains("**Coverage**: 10%"));
    }

    #[tokio::test]
    async fn test_coverage_meeting_threshold_succeeds() {
        let _guard = crate::test_env::LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let coverage_dir = dir.path().join("coverage");
        std::fs::create_dir_all(&coverage_dir).unwrap();
        std::fs::write(
            coverage_dir.join("coverage-summary.json"),
            r#"{ "total": { "statements": { "pct": 85.5 } } }"#,
        )
        .unwrap();

        let mut inputs = disabled_inputs();
        inputs.relative_path = dir.path().to_path_buf();
        inputs.run_unit_tests = true;
        inputs.unit_test_command = Some("echo all tests passed".to_string());
        inputs.min_coverage = Some(80.0);

        let outcome = Pipeline::run_with(Ok(inputs)).await;
        assert!(outcome.success, "failed: {:?}", outcome.failure_message);
        assert_eq!(outcome.coverage, Some(85.5));
        assert!(outcome.markdown.contains("**Coverage**: 85.5%"));
        assert!(outcome.markdown.contains("all tests passed"));
    }

    #[test]
    fn test_empty_error_message_maps_to_unknown() {
        let err = PipelineError::Io(std::io::Error::other(""));
        assert_eq!(failure_message(&err), "Unknown error occurred");
    }

    #[test]
    fn test_error_message_reported_verbatim() {
        let err = PipelineError::MissingInput("minCoverage".to_string());
        assert_eq!(
            failure_message(&err),
            "Input required and not supplied: minCoverage"
        );
    }
}
