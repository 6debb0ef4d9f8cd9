//! Testinium REST API client

pub mod client;
pub mod http_client;
pub mod payload;
pub mod response;

use crate::core::{AccessToken, Credentials, Project, StageOutcome};
use async_trait::async_trait;
use std::path::Path;

pub use client::ApiClientConfig;
pub use http_client::TestiniumHttpClient;
pub use payload::ProjectUpdate;
pub use response::{ApiError, ReportResponse, RunResponse, TokenResponse, UploadResponse};

/// The remote operations the workflow needs - allows for different implementations
///
/// Every call reports a classified `StageOutcome` instead of an error so
/// the workflow can apply the same retry policy to all of them.
#[async_trait]
pub trait TestiniumApi: Send + Sync {
    /// Exchange the account credentials for an access token
    async fn authenticate(&self, credentials: &Credentials) -> StageOutcome<TokenResponse>;

    /// Load the project descriptor
    async fn find_project(&self, project_id: &str, token: &AccessToken) -> StageOutcome<Project>;

    /// Upload the app artifact
    async fn upload(&self, artifact: &Path, token: &AccessToken) -> StageOutcome<UploadResponse>;

    /// Attach an uploaded artifact to the project
    async fn update_project(
        &self,
        update: &ProjectUpdate,
        token: &AccessToken,
    ) -> StageOutcome<Project>;

    /// Start a run of the plan
    async fn trigger_run(&self, plan_id: &str, token: &AccessToken) -> StageOutcome<RunResponse>;

    /// Whether the plan currently has a run in progress
    async fn is_running(&self, plan_id: &str, token: &AccessToken) -> StageOutcome<bool>;

    /// Load the report of a finished execution
    async fn fetch_report(
        &self,
        execution_id: &str,
        token: &AccessToken,
    ) -> StageOutcome<ReportResponse>;
}
