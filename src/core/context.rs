//! Run context - state threaded through the pipeline stages

use crate::core::{
    error::WorkflowError,
    project::{AccessToken, Project, UploadedFile},
    report::ResultSummary,
    state::Stage,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Record of a finished stage
#[derive(Debug, Clone)]
pub struct StageRecord {
    pub stage: Stage,

    /// Remote calls made by the stage (including failed ones)
    pub attempts: usize,

    pub started_at: DateTime<Utc>,

    pub completed_at: DateTime<Utc>,
}

/// Accumulated state of one pipeline run
///
/// Each stage reads the fields produced by earlier stages and fills in its
/// own. Only the orchestrator writes to it.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Local identifier used to correlate log lines
    pub run_id: Uuid,

    pub access_token: Option<AccessToken>,

    pub project: Option<Project>,

    pub uploaded_file: Option<UploadedFile>,

    pub execution_id: Option<String>,

    pub result_summary: Option<ResultSummary>,

    /// Finished stages in execution order
    pub stages: Vec<StageRecord>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            access_token: None,
            project: None,
            uploaded_file: None,
            execution_id: None,
            result_summary: None,
            stages: Vec::new(),
        }
    }

    /// Access token, required by every stage after authentication
    pub fn access_token(&self, stage: Stage) -> Result<&AccessToken, WorkflowError> {
        self.access_token
            .as_ref()
            .ok_or(WorkflowError::MissingRequiredField {
                stage,
                field: "access_token",
            })
    }

    pub fn project(&self, stage: Stage) -> Result<&Project, WorkflowError> {
        self.project
            .as_ref()
            .ok_or(WorkflowError::MissingRequiredField {
                stage,
                field: "project",
            })
    }

    pub fn uploaded_file(&self, stage: Stage) -> Result<&UploadedFile, WorkflowError> {
        self.uploaded_file
            .as_ref()
            .ok_or(WorkflowError::MissingRequiredField {
                stage,
                field: "file_token",
            })
    }

    pub fn execution_id(&self, stage: Stage) -> Result<&str, WorkflowError> {
        self.execution_id
            .as_deref()
            .ok_or(WorkflowError::MissingRequiredField {
                stage,
                field: "execution_id",
            })
    }

    /// Record a finished stage
    pub fn record_stage(&mut self, stage: Stage, attempts: usize, started_at: DateTime<Utc>) {
        self.stages.push(StageRecord {
            stage,
            attempts,
            started_at,
            completed_at: Utc::now(),
        });
    }

    /// Attempts used by a finished stage
    pub fn attempts_for(&self, stage: Stage) -> Option<usize> {
        self.stages
            .iter()
            .find(|record| record.stage == stage)
            .map(|record| record.attempts)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
