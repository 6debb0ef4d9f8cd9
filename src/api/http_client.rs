//! reqwest-backed implementation of the Testinium API

use crate::api::{
    response::{
        excerpt, ApiError, ReportResponse, RunResponse, StatusResponse, TokenResponse,
        UploadResponse,
    },
    ApiClientConfig, ProjectUpdate, TestiniumApi,
};
use crate::core::{AccessToken, Credentials, Project, StageOutcome};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the Testinium REST API
#[derive(Debug, Clone)]
pub struct TestiniumHttpClient {
    http: Client,
    config: ApiClientConfig,
}

impl TestiniumHttpClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns `ApiError::Transport` if the underlying HTTP client cannot be
    /// built (e.g. TLS backend initialisation fails).
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("testinium-pipeline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// Send a request and decode its JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("HTTP {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(ApiError::status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            body: excerpt(&body),
            error: e.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &AccessToken) -> StageOutcome<T> {
        let url = self.config.endpoint(path);
        debug!("GET {}", url);
        let request = self.http.get(url).bearer_auth(token.as_str());
        self.send(request).await.into()
    }

    async fn upload_form(&self, artifact: &Path) -> Result<Form, ApiError> {
        let bytes = tokio::fs::read(artifact).await?;
        let file_name = artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());

        debug!("Uploading {} ({} bytes)", file_name, bytes.len());

        Ok(Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("isSignRequired", "true"))
    }
}

#[async_trait]
impl TestiniumApi for TestiniumHttpClient {
    async fn authenticate(&self, credentials: &Credentials) -> StageOutcome<TokenResponse> {
        debug!("POST {}", self.config.auth_url);
        let request = self
            .http
            .post(&self.config.auth_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ]);
        self.send(request).await.into()
    }

    async fn find_project(&self, project_id: &str, token: &AccessToken) -> StageOutcome<Project> {
        self.get(&format!("projects/{}", project_id), token).await
    }

    async fn upload(&self, artifact: &Path, token: &AccessToken) -> StageOutcome<UploadResponse> {
        let form = match self.upload_form(artifact).await {
            Ok(form) => form,
            Err(err) => return err.into_outcome(),
        };

        let url = self.config.endpoint("file/upload");
        debug!("POST {}", url);
        let request = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "*/*")
            .bearer_auth(token.as_str())
            .multipart(form);
        self.send(request).await.into()
    }

    async fn update_project(
        &self,
        update: &ProjectUpdate,
        token: &AccessToken,
    ) -> StageOutcome<Project> {
        let url = self.config.endpoint(&format!("projects/{}", update.project_id));
        debug!("PUT {}", url);
        let request = self.http.put(url).bearer_auth(token.as_str()).json(update);
        self.send(request).await.into()
    }

    async fn trigger_run(&self, plan_id: &str, token: &AccessToken) -> StageOutcome<RunResponse> {
        self.get(&format!("plans/{}/run", plan_id), token).await
    }

    async fn is_running(&self, plan_id: &str, token: &AccessToken) -> StageOutcome<bool> {
        self.get::<StatusResponse>(&format!("plans/{}/checkIsRunning", plan_id), token)
            .await
            .map(|status| status.running)
    }

    async fn fetch_report(
        &self,
        execution_id: &str,
        token: &AccessToken,
    ) -> StageOutcome<ReportResponse> {
        self.get(&format!("executions/{}", execution_id), token).await
    }
}
