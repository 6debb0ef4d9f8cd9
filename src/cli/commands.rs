//! Step inputs and their resolution into a run configuration

use crate::api::{client::DEFAULT_API_URL, client::DEFAULT_AUTH_URL, ApiClientConfig};
use crate::core::{Credentials, Platform, RunConfig, WorkflowError, DEFAULT_MAX_ATTEMPTS};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Step inputs
///
/// Every input can be given as a flag or through the environment variable
/// the CI platform sets for the step.
#[derive(Debug, Args, Clone)]
pub struct SettingsArgs {
    /// Path of the app artifact (.apk or .ipa) to upload
    #[arg(long, env = "AC_TESTINIUM_APP_PATH")]
    pub app_path: Option<PathBuf>,

    /// Testinium account user name
    #[arg(long, env = "AC_TESTINIUM_USERNAME")]
    pub username: Option<String>,

    /// Testinium account password
    #[arg(long, env = "AC_TESTINIUM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Plan to run
    #[arg(long, env = "AC_TESTINIUM_PLAN_ID")]
    pub plan_id: Option<String>,

    /// Project that receives the uploaded artifact
    #[arg(long, env = "AC_TESTINIUM_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Time budget for the whole run, in minutes
    #[arg(long, env = "AC_TESTINIUM_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Attempts per API call before the step gives up
    #[arg(
        long,
        env = "AC_TESTINIUM_MAX_API_RETRY_COUNT",
        default_value_t = DEFAULT_MAX_ATTEMPTS
    )]
    pub max_retry_count: usize,

    /// Highest acceptable failure percentage (0 disables the check)
    #[arg(
        long,
        env = "AC_TESTINIUM_MAX_FAIL_PERCENTAGE",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub max_fail_percentage: i64,

    /// Env file that receives the result counters
    #[arg(long, env = "AC_ENV_FILE_PATH")]
    pub output_file: Option<PathBuf>,

    /// CI platform type (ObjectiveCSwift selects iOS)
    #[arg(long, env = "AC_PLATFORM_TYPE")]
    pub platform: Option<String>,

    /// REST API base URL
    #[arg(long, env = "AC_TESTINIUM_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// OAuth token endpoint
    #[arg(long, env = "AC_TESTINIUM_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    pub auth_url: String,

    /// Timeout for a single API request, in seconds
    #[arg(long, env = "AC_TESTINIUM_REQUEST_TIMEOUT", default_value_t = 300)]
    pub request_timeout: u64,

    /// Seconds between two status polls
    #[arg(long, env = "AC_TESTINIUM_POLL_INTERVAL", default_value_t = 30)]
    pub poll_interval: u64,
}

/// Validated settings for a run
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub run: RunConfig,
    pub api: ApiClientConfig,
}

impl SettingsArgs {
    /// Resolve the inputs into validated run and client configurations
    pub fn resolve(&self) -> Result<ResolvedSettings, WorkflowError> {
        let app_path = required("AC_TESTINIUM_APP_PATH", self.app_path.clone())?;
        let credentials = Credentials {
            username: required_text("AC_TESTINIUM_USERNAME", &self.username)?,
            password: required_text("AC_TESTINIUM_PASSWORD", &self.password)?,
        };
        let plan_id = required_text("AC_TESTINIUM_PLAN_ID", &self.plan_id)?;
        let project_id = required_text("AC_TESTINIUM_PROJECT_ID", &self.project_id)?;
        let timeout_minutes = required("AC_TESTINIUM_TIMEOUT", self.timeout)?;

        let mut run = RunConfig::new(
            app_path,
            credentials,
            plan_id,
            project_id,
            Duration::from_secs(timeout_minutes.saturating_mul(60)),
        )
        .with_platform(Platform::from_platform_type(self.platform.as_deref()))
        .with_max_attempts(self.max_retry_count)
        .with_max_failure_percentage(self.max_fail_percentage)
        .with_poll_interval(Duration::from_secs(self.poll_interval));
        if let Some(output_file) = self.output_file.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            run = run.with_output_file(output_file);
        }
        run.validate()?;

        let api = ApiClientConfig::new()
            .with_api_url(self.api_url.as_str())
            .with_auth_url(self.auth_url.as_str())
            .with_timeout(self.request_timeout);

        Ok(ResolvedSettings { run, api })
    }
}

fn required<T>(key: &str, value: Option<T>) -> Result<T, WorkflowError> {
    value.ok_or_else(|| WorkflowError::Config(format!("Missing {}.", key)))
}

/// Empty values count as missing
fn required_text(key: &str, value: &Option<String>) -> Result<String, WorkflowError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(WorkflowError::Config(format!("Missing {}.", key))),
    }
}
