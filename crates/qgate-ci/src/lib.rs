//! qgate CI - quality-gate pipeline step
//!
//! Provides a CI pipeline orchestrator that:
//! - Runs lint, dependency audit, unit tests and integration tests
//! - Extracts statement coverage and gates on a minimum threshold
//! - Always renders a markdown report and emits `coverage`/`report`
//!   outputs to the invoking pipeline, even when a stage fails

pub mod actions;
pub mod coverage;
pub mod error;
pub mod gate;
pub mod inputs;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod stage;
pub mod telemetry;

// Re-export key types
pub use coverage::{Coverage, CoverageSummary};
pub use error::{PipelineError, Result};
pub use gate::CoverageGate;
pub use inputs::{PipelineInputs, ServiceUrl};
pub use pipeline::{Pipeline, RunOutcome};
pub use report::render_markdown;
pub use runner::{StageOutput, StageRunner};
pub use stage::{BuiltinStage, StageConfig};
pub use telemetry::init_tracing;
