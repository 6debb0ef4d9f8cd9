//! Remote project and artifact models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token returned by the authenticate call
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Project descriptor as returned by the project endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,

    #[serde(default)]
    pub project_name: Option<String>,

    #[serde(default)]
    pub test_framework: Option<String>,

    #[serde(default)]
    pub test_runner_tool: Option<String>,

    #[serde(default)]
    pub repository_path: Option<String>,

    #[serde(default)]
    pub test_file_type: Option<String>,

    /// Hash of the iOS app currently attached to the project
    #[serde(default)]
    pub ios_mobile_app_hash: Option<String>,

    /// Hash of the Android app currently attached to the project
    #[serde(default)]
    pub android_mobile_app_hash: Option<String>,
}

impl Project {
    /// Name used in progress output
    pub fn display_name(&self) -> String {
        self.project_name
            .clone()
            .unwrap_or_else(|| format!("project {}", self.id))
    }
}

/// Result of uploading the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Token referencing the uploaded file in later calls
    pub file_token: String,

    /// Platform metadata extracted by the service (present for iOS builds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<serde_json::Value>,
}
