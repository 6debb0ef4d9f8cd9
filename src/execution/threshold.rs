//! Pass/fail decision from the execution report

use crate::core::{ResultSummary, WorkflowError};
use tracing::warn;

/// Percentage of `numerator` in `denominator`
///
/// Zero when the denominator is zero. Negative inputs are rejected.
pub fn percent(numerator: i64, denominator: i64) -> Result<f64, WorkflowError> {
    if numerator < 0 || denominator < 0 {
        return Err(WorkflowError::NegativeCount {
            numerator,
            denominator,
        });
    }
    if denominator == 0 {
        return Ok(0.0);
    }
    Ok(numerator as f64 / denominator as f64 * 100.0)
}

/// Result of evaluating a report
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Failure rate is within the allowed maximum
    Passed { failure_percentage: f64 },
    /// The threshold check was disabled or there were no failures
    PassedWithoutThreshold,
    Failed { reason: String },
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        !matches!(self, Verdict::Failed { .. })
    }
}

/// Decides whether a report is acceptable
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEvaluator {
    max_failure_percentage: i64,
}

impl ThresholdEvaluator {
    pub fn new(max_failure_percentage: i64) -> Self {
        Self {
            max_failure_percentage,
        }
    }

    /// Evaluate the summary
    ///
    /// Any `ERROR` outcome fails the run, even when the threshold check is
    /// skipped.
    pub fn evaluate(&self, summary: &ResultSummary) -> Result<Verdict, WorkflowError> {
        let failure = to_count(summary.failure);
        let error = to_count(summary.error);
        let total = to_count(summary.total());

        if self.max_failure_percentage <= 0 || failure == 0 {
            warn!(
                "Skipping failure threshold evaluation (max fail percentage: {}, failures: {})",
                self.max_failure_percentage, failure
            );
            if error > 0 {
                return Ok(Verdict::Failed {
                    reason: error_reason(summary.error),
                });
            }
            return Ok(Verdict::PassedWithoutThreshold);
        }

        let failure_percentage = percent(failure, total)?;
        let max_allowed = percent(self.max_failure_percentage, 100)?;

        if error > 0 {
            return Ok(Verdict::Failed {
                reason: error_reason(summary.error),
            });
        }
        if max_allowed <= failure_percentage {
            return Ok(Verdict::Failed {
                reason: format!(
                    "failure rate {:.2}% reached the allowed maximum of {:.2}%",
                    failure_percentage, max_allowed
                ),
            });
        }

        Ok(Verdict::Passed { failure_percentage })
    }
}

fn error_reason(errors: u64) -> String {
    format!("{} test(s) ended with ERROR", errors)
}

fn to_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
