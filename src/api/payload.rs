//! Request body for pointing a project at a new artifact

use crate::core::{Platform, Project, UploadedFile};
use serde::Serialize;

/// Body of the project update call
///
/// Android and iOS projects reference their app through different fields;
/// only the fields of the selected platform are serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip)]
    pub project_id: u64,

    pub enabled: bool,

    pub project_name: Option<String>,

    pub test_framework: Option<String>,

    pub test_runner_tool: Option<String>,

    pub repository_path: Option<String>,

    pub test_file_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_mobile_app: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_file_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios_mobile_app: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios_file_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios_meta: Option<serde_json::Value>,
}

impl ProjectUpdate {
    /// Build the update that attaches `uploaded` to `project`
    pub fn for_upload(
        project: &Project,
        platform: Platform,
        file_name: &str,
        uploaded: &UploadedFile,
    ) -> Self {
        let mut update = ProjectUpdate {
            project_id: project.id,
            enabled: true,
            project_name: project.project_name.clone(),
            test_framework: project.test_framework.clone(),
            test_runner_tool: project.test_runner_tool.clone(),
            repository_path: project.repository_path.clone(),
            test_file_type: project.test_file_type.clone(),
            android_mobile_app: None,
            android_file_token: None,
            ios_mobile_app: None,
            ios_file_token: None,
            ios_meta: None,
        };

        match platform {
            Platform::Android => {
                update.android_mobile_app = Some(file_name.to_string());
                update.android_file_token = Some(uploaded.file_token.clone());
            }
            Platform::Ios => {
                update.ios_mobile_app = Some(file_name.to_string());
                update.ios_file_token = Some(uploaded.file_token.clone());
                update.ios_meta = uploaded.meta_data.clone();
            }
        }

        update
    }
}
