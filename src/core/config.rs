//! Run configuration
//!
//! A `RunConfig` is resolved once at startup (see `cli::commands`) and then
//! passed by reference into every component. Nothing reads the environment
//! after this point.

use crate::core::error::WorkflowError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of attempts per stage
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Default spacing between two status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Mobile platform the uploaded artifact targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Ios,
    #[default]
    Android,
}

impl Platform {
    /// Map the CI platform type onto an upload platform
    ///
    /// Only native iOS projects report `ObjectiveCSwift`; everything else
    /// produces an Android build.
    pub fn from_platform_type(platform_type: Option<&str>) -> Self {
        match platform_type {
            Some("ObjectiveCSwift") => Platform::Ios,
            _ => Platform::Android,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => f.write_str("ios"),
            Platform::Android => f.write_str("android"),
        }
    }
}

/// Account credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable configuration for a single pipeline run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// App artifact to upload
    pub app_path: PathBuf,

    pub credentials: Credentials,

    /// Test plan to trigger
    pub plan_id: String,

    /// Project that is reconfigured to reference the uploaded artifact
    pub project_id: String,

    pub platform: Platform,

    /// Wall-clock budget for the whole run
    pub timeout: Duration,

    /// Attempts allowed per stage (shared by every stage)
    pub max_attempts: usize,

    /// Highest acceptable failure rate, 0 disables the check
    pub max_failure_percentage: i64,

    /// Spacing between two status polls
    pub poll_interval: Duration,

    /// CI env file that receives the result counters
    pub output_file: Option<PathBuf>,
}

impl RunConfig {
    /// Create a configuration with default retry, threshold and polling settings
    pub fn new(
        app_path: impl Into<PathBuf>,
        credentials: Credentials,
        plan_id: impl Into<String>,
        project_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            app_path: app_path.into(),
            credentials,
            plan_id: plan_id.into(),
            project_id: project_id.into(),
            platform: Platform::default(),
            timeout,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_failure_percentage: 0,
            poll_interval: DEFAULT_POLL_INTERVAL,
            output_file: None,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_failure_percentage(mut self, percentage: i64) -> Self {
        self.max_failure_percentage = percentage;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// File name of the artifact, as shown to the remote project
    pub fn app_file_name(&self) -> String {
        self.app_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.app_path.to_string_lossy().into_owned())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), WorkflowError> {
        require_non_empty("username", &self.credentials.username)?;
        require_non_empty("password", &self.credentials.password)?;
        require_non_empty("plan id", &self.plan_id)?;
        require_non_empty("project id", &self.project_id)?;

        if !is_file(&self.app_path) {
            return Err(WorkflowError::Config(format!(
                "app artifact '{}' does not exist or is not a file",
                self.app_path.display()
            )));
        }
        if self.timeout.is_zero() {
            return Err(WorkflowError::Config(
                "timeout must be at least one minute".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(WorkflowError::Config(
                "max retry count must be at least 1".to_string(),
            ));
        }
        if !(0..=100).contains(&self.max_failure_percentage) {
            return Err(WorkflowError::Config(format!(
                "max fail percentage must be between 0 and 100, got {}",
                self.max_failure_percentage
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(WorkflowError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn require_non_empty(name: &str, value: &str) -> Result<(), WorkflowError> {
    if value.trim().is_empty() {
        return Err(WorkflowError::Config(format!("missing {}", name)));
    }
    Ok(())
}

fn is_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
