//! Execution report counts

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Outcome counts returned by the report endpoint
///
/// Missing keys and explicit `null`s deserialize to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    #[serde(rename = "SUCCESS", default, deserialize_with = "null_as_default")]
    pub success: u64,

    #[serde(rename = "FAILURE", default, deserialize_with = "null_as_default")]
    pub failure: u64,

    #[serde(rename = "ERROR", default, deserialize_with = "null_as_default")]
    pub error: u64,
}

impl ResultSummary {
    pub fn new(success: u64, failure: u64, error: u64) -> Self {
        Self {
            success,
            failure,
            error,
        }
    }

    /// Total number of test outcomes, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.success
            .saturating_add(self.failure)
            .saturating_add(self.error)
    }
}

/// Treat an explicit `null` like a missing value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SUCCESS: {}, FAILURE: {}, ERROR: {}",
            self.success, self.failure, self.error
        )
    }
}
