//! API error and response types

use crate::core::{ResultSummary, StageOutcome};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest body excerpt kept in error messages
const MAX_BODY_EXCERPT: usize = 512;

/// Error types for API operations
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode response: {error}")]
    Decode { body: String, error: String },

    #[error("could not read artifact: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Build a status error, keeping a bounded excerpt of the body
    pub fn status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            body: excerpt(body),
        }
    }

    /// Classify the error as a stage outcome
    ///
    /// 4xx answers are client errors. 5xx answers and unreachable hosts are
    /// server errors. Undecodable bodies are malformed responses.
    pub fn into_outcome<T>(self) -> StageOutcome<T> {
        let message = self.to_string();
        match self {
            ApiError::Status { status, .. } if status.is_client_error() => {
                StageOutcome::ClientError(message)
            }
            ApiError::Status { .. } | ApiError::Transport(_) => StageOutcome::ServerError(message),
            ApiError::Decode { body, error } => {
                StageOutcome::MalformedResponse { raw: body, error }
            }
            ApiError::Io(_) => StageOutcome::ClientError(message),
        }
    }
}

impl<T> From<ApiError> for StageOutcome<T> {
    fn from(err: ApiError) -> Self {
        err.into_outcome()
    }
}

impl<T> From<Result<T, ApiError>> for StageOutcome<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => StageOutcome::Success(value),
            Err(err) => err.into_outcome(),
        }
    }
}

/// Truncate a response body for logging
pub fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_EXCERPT {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(MAX_BODY_EXCERPT).collect();
    format!("{}...", head)
}

/// Body of the OAuth token endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Body of the upload endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub file_token: Option<String>,

    #[serde(default)]
    pub meta_data: Option<serde_json::Value>,
}

/// Body of the plan run endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub execution_id: Option<serde_json::Value>,
}

impl RunResponse {
    /// Execution id as a string, whether the service sent a number or a string
    pub fn execution_id(&self) -> Option<String> {
        match self.execution_id.as_ref()? {
            serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
            serde_json::Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Body of the plan status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
}

/// Body of the execution report endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportResponse {
    #[serde(default, deserialize_with = "crate::core::report::null_as_default")]
    pub result_summary: ResultSummary,
}
