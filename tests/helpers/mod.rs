//! Test utilities for the workflow tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use testinium_pipeline::api::{
    ProjectUpdate, ReportResponse, RunResponse, TestiniumApi, TokenResponse, UploadResponse,
};
use testinium_pipeline::core::{
    AccessToken, Credentials, Project, ResultSummary, RunConfig, StageOutcome,
};
use testinium_pipeline::execution::{WorkflowEvent, WorkflowOrchestrator};

/// Outcomes returned by one operation, in order
///
/// Once the queue is drained every call gets the fallback outcome.
pub struct Script<T> {
    queue: Mutex<VecDeque<StageOutcome<T>>>,
    fallback: StageOutcome<T>,
    calls: AtomicUsize,
}

impl<T: Clone> Script<T> {
    pub fn always(fallback: StageOutcome<T>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    fn replace(&mut self, outcomes: Vec<StageOutcome<T>>) {
        self.queue = Mutex::new(outcomes.into());
    }

    fn next(&self) -> StageOutcome<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Number of times the operation was called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Mock API that plays back scripted outcomes per operation
///
/// Unscripted operations succeed: the login yields a token, the project
/// exists, the upload yields file token `T1`, the run gets execution id
/// `E1`, the plan is never running and the report is all green.
pub struct ScriptedApi {
    pub auth: Script<TokenResponse>,
    pub project: Script<Project>,
    pub upload: Script<UploadResponse>,
    pub update: Script<Project>,
    pub trigger: Script<RunResponse>,
    pub status: Script<bool>,
    pub report: Script<ReportResponse>,
    pub updates: Mutex<Vec<ProjectUpdate>>,
    pub reports_requested: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            auth: Script::always(StageOutcome::Success(token("token-1"))),
            project: Script::always(StageOutcome::Success(project())),
            upload: Script::always(StageOutcome::Success(uploaded("T1"))),
            update: Script::always(StageOutcome::Success(project())),
            trigger: Script::always(StageOutcome::Success(RunResponse {
                execution_id: Some(serde_json::json!("E1")),
            })),
            status: Script::always(StageOutcome::Success(false)),
            report: Script::always(StageOutcome::Success(report(10, 0, 0))),
            updates: Mutex::new(Vec::new()),
            reports_requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_auth(mut self, outcomes: Vec<StageOutcome<TokenResponse>>) -> Self {
        self.auth.replace(outcomes);
        self
    }

    pub fn with_project(mut self, fallback: StageOutcome<Project>) -> Self {
        self.project = Script::always(fallback);
        self
    }

    pub fn with_upload(mut self, outcomes: Vec<StageOutcome<UploadResponse>>) -> Self {
        self.upload.replace(outcomes);
        self
    }

    pub fn with_status(mut self, outcomes: Vec<StageOutcome<bool>>) -> Self {
        self.status.replace(outcomes);
        self
    }

    /// Plan keeps running once the scripted answers are used up
    pub fn running_forever(mut self, outcomes: Vec<StageOutcome<bool>>) -> Self {
        self.status = Script::always(StageOutcome::Success(true));
        self.status.replace(outcomes);
        self
    }

    pub fn with_report(mut self, summary: ResultSummary) -> Self {
        self.report = Script::always(StageOutcome::Success(ReportResponse {
            result_summary: summary,
        }));
        self
    }

    /// Calls made to every operation, in stage order
    pub fn call_counts(&self) -> [usize; 7] {
        [
            self.auth.calls(),
            self.project.calls(),
            self.upload.calls(),
            self.update.calls(),
            self.trigger.calls(),
            self.status.calls(),
            self.report.calls(),
        ]
    }
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestiniumApi for ScriptedApi {
    async fn authenticate(&self, _credentials: &Credentials) -> StageOutcome<TokenResponse> {
        self.auth.next()
    }

    async fn find_project(&self, _project_id: &str, _token: &AccessToken) -> StageOutcome<Project> {
        self.project.next()
    }

    async fn upload(&self, _artifact: &Path, _token: &AccessToken) -> StageOutcome<UploadResponse> {
        self.upload.next()
    }

    async fn update_project(
        &self,
        update: &ProjectUpdate,
        _token: &AccessToken,
    ) -> StageOutcome<Project> {
        self.updates.lock().unwrap().push(update.clone());
        self.update.next()
    }

    async fn trigger_run(&self, _plan_id: &str, _token: &AccessToken) -> StageOutcome<RunResponse> {
        self.trigger.next()
    }

    async fn is_running(&self, _plan_id: &str, _token: &AccessToken) -> StageOutcome<bool> {
        self.status.next()
    }

    async fn fetch_report(
        &self,
        execution_id: &str,
        _token: &AccessToken,
    ) -> StageOutcome<ReportResponse> {
        self.reports_requested
            .lock()
            .unwrap()
            .push(execution_id.to_string());
        self.report.next()
    }
}

pub fn token(value: &str) -> TokenResponse {
    TokenResponse {
        access_token: Some(value.to_string()),
    }
}

pub fn uploaded(file_token: &str) -> UploadResponse {
    UploadResponse {
        file_token: Some(file_token.to_string()),
        meta_data: None,
    }
}

pub fn report(success: u64, failure: u64, error: u64) -> ReportResponse {
    ReportResponse {
        result_summary: ResultSummary::new(success, failure, error),
    }
}

pub fn project() -> Project {
    serde_json::from_value(serde_json::json!({
        "id": 7,
        "project_name": "Checkout",
        "test_framework": "APPIUM",
        "test_runner_tool": "MAVEN",
        "repository_path": "git@example.com:qa/checkout.git",
        "test_file_type": "JAVA"
    }))
    .unwrap()
}

/// Run configuration for plan 42 of project 7
pub fn run_config(app_path: impl Into<PathBuf>, timeout: Duration) -> RunConfig {
    RunConfig::new(
        app_path,
        Credentials {
            username: "qa@example.com".to_string(),
            password: "secret".to_string(),
        },
        "42",
        "7",
        timeout,
    )
}

/// Record every event the orchestrator emits
pub fn record_events<A: TestiniumApi>(
    orchestrator: &mut WorkflowOrchestrator<A>,
) -> Arc<Mutex<Vec<WorkflowEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    orchestrator.add_event_handler(move |event| sink.lock().unwrap().push(event.clone()));
    events
}
