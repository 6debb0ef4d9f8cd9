//! Stage and outcome models

use std::fmt;

/// One named step of the fixed pipeline sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Exchange the account credentials for an access token
    Authenticate,
    /// Load the project descriptor
    FindProject,
    /// Upload the app artifact
    Upload,
    /// Point the project at the uploaded artifact
    UpdateProject,
    /// Wait for any previous run of the plan to finish
    WaitForIdle,
    /// Start the plan
    TriggerRun,
    /// Wait for the triggered run to finish
    WaitForCompletion,
    /// Download the execution report
    FetchReport,
    /// Decide pass/fail from the report
    Evaluate,
}

impl Stage {
    /// Every stage in execution order
    pub const SEQUENCE: [Stage; 9] = [
        Stage::Authenticate,
        Stage::FindProject,
        Stage::Upload,
        Stage::UpdateProject,
        Stage::WaitForIdle,
        Stage::TriggerRun,
        Stage::WaitForCompletion,
        Stage::FetchReport,
        Stage::Evaluate,
    ];

    /// Stable identifier used in logs and events
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Authenticate => "authenticate",
            Stage::FindProject => "find-project",
            Stage::Upload => "upload",
            Stage::UpdateProject => "update-project",
            Stage::WaitForIdle => "wait-for-idle",
            Stage::TriggerRun => "trigger-run",
            Stage::WaitForCompletion => "wait-for-completion",
            Stage::FetchReport => "fetch-report",
            Stage::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified result of a single remote call
///
/// Only `Success` carries data forward. Every other variant is fed back into
/// the retry budget of the calling stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    Success(T),
    /// The service answered with a 4xx status
    ClientError(String),
    /// The service answered with a 5xx status, or could not be reached
    ServerError(String),
    /// The body could not be decoded into the expected shape
    MalformedResponse { raw: String, error: String },
}

impl<T> StageOutcome<T> {
    /// Transform the success payload, keeping failures as they are
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> StageOutcome<U> {
        match self {
            StageOutcome::Success(value) => StageOutcome::Success(f(value)),
            StageOutcome::ClientError(message) => StageOutcome::ClientError(message),
            StageOutcome::ServerError(message) => StageOutcome::ServerError(message),
            StageOutcome::MalformedResponse { raw, error } => {
                StageOutcome::MalformedResponse { raw, error }
            }
        }
    }

    /// Human-readable description of a failed outcome
    ///
    /// Returns `None` for `Success`.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            StageOutcome::Success(_) => None,
            StageOutcome::ClientError(message) => Some(format!("client error: {}", message)),
            StageOutcome::ServerError(message) => Some(format!("server error: {}", message)),
            StageOutcome::MalformedResponse { raw, error } => {
                Some(format!("malformed response ({}): {}", error, raw))
            }
        }
    }
}
