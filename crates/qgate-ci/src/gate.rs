//! Coverage gate evaluation.

use crate::coverage::Coverage;
use crate::error::{PipelineError, Result};

/// Pass/fail gate for the measured coverage.
pub struct CoverageGate;

impl CoverageGate {
    /// Evaluate measured coverage against the configured minimum.
    ///
    /// A value strictly below the threshold is a distinguished
    /// failure. `NotRequested` never triggers the gate.
    pub fn evaluate(coverage: &Coverage, min: f64) -> Result<()> {
        if let Coverage::Measured(pct) = coverage {
            if *pct < min {
                return Err(PipelineError::BelowThreshold {
                    coverage: *pct,
                    min,
                });
            }
        }
        Ok(())
    }
}
