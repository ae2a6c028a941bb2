//! Action-style input reading.
//!
//! Inputs arrive as `INPUT_<NAME>` environment variables, the way a
//! CI runner passes step configuration. All inputs a run needs are
//! read once up front into [`PipelineInputs`] and are immutable for
//! the rest of the run. A required input that is missing or blank is
//! an immediate [`PipelineError::MissingInput`].

use std::env;
use std::path::PathBuf;

use crate::error::{PipelineError, Result};

/// Environment variable carrying the input `name`.
fn input_var(name: &str) -> String {
    format!("INPUT_{}", name.to_uppercase())
}

/// Read a required string input. Trims surrounding whitespace.
pub fn get_input(name: &str) -> Result<String> {
    let raw = env::var(input_var(name)).unwrap_or_default();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::MissingInput(name.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Read an optional string input. Blank counts as absent.
pub fn get_optional_input(name: &str) -> Option<String> {
    let raw = env::var(input_var(name)).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read a required boolean input. Accepts the YAML 1.2 core booleans
/// `true/True/TRUE` and `false/False/FALSE`.
pub fn get_bool_input(name: &str) -> Result<bool> {
    let value = get_input(name)?;
    match value.as_str() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(PipelineError::InvalidInput {
            name: name.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Fields composed into the integration-test service URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl {
    pub prefix: String,
    pub app_name: String,
    pub namespace: String,
    pub service_domain: String,
    pub service_port: String,
}

impl ServiceUrl {
    /// `{prefix}{appName}.{namespace}.{serviceDomain}:{servicePort}`
    pub fn compose(&self) -> String {
        format!(
            "{}{}.{}.{}:{}",
            self.prefix, self.app_name, self.namespace, self.service_domain, self.service_port
        )
    }
}

/// Full configuration for one pipeline run.
///
/// Phase-specific inputs (`unitTestCommand`, `minCoverage`,
/// `intTestCommand` and the URL fields) are only required when the
/// owning phase is enabled.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub relative_path: PathBuf,
    pub run_lint: bool,
    pub run_audit: bool,
    pub run_unit_tests: bool,
    pub run_integration_tests: bool,
    pub unit_test_command: Option<String>,
    pub int_test_command: Option<String>,
    pub min_coverage: Option<f64>,
    pub report_title: String,
    pub service_url: Option<ServiceUrl>,
}

impl PipelineInputs {
    /// Read and validate all inputs for this run.
    pub fn from_env() -> Result<Self> {
        let relative_path = PathBuf::from(get_input("relativePath")?);
        let run_lint = get_bool_input("runLint")?;
        let run_audit = get_bool_input("runAudit")?;
        let run_unit_tests = get_bool_input("runUnitTests")?;
        let run_integration_tests = get_bool_input("runIntegrationTests")?;

        let (unit_test_command, min_coverage) = if run_unit_tests {
            let command = get_input("unitTestCommand")?;
            let raw = get_input("minCoverage")?;
            let min = raw.parse::<f64>().map_err(|_| PipelineError::InvalidInput {
                name: "minCoverage".to_string(),
                reason: format!("expected a number, got '{raw}'"),
            })?;
            (Some(command), Some(min))
        } else {
            (None, None)
        };

        let (int_test_command, service_url) = if run_integration_tests {
            let command = get_input("intTestCommand")?;
            let url = ServiceUrl {
                prefix: get_input("prefix")?,
                app_name: get_input("appName")?,
                namespace: get_input("namespace")?,
                service_domain: get_input("serviceDomain")?,
                service_port: get_input("servicePort")?,
            };
            (Some(command), Some(url))
        } else {
            (None, None)
        };

        let report_title = get_optional_input("reportTitle")
            .unwrap_or_else(|| "Code Quality Report".to_string());

        Ok(Self {
            relative_path,
            run_lint,
            run_audit,
            run_unit_tests,
            run_integration_tests,
            unit_test_command,
            int_test_command,
            min_coverage,
            report_title,
            service_url,
        })
    }
}
