//! Persistence of result counters for later CI steps

use crate::core::{ResultSummary, WorkflowError};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Env file key for the FAILURE count
pub const FAILURE_KEY: &str = "AC_TESTINIUM_RESULT_FAILURE_SUMMARY";

/// Env file key for the ERROR count
pub const ERROR_KEY: &str = "AC_TESTINIUM_RESULT_ERROR_SUMMARY";

/// Env file key for the SUCCESS count
pub const SUCCESS_KEY: &str = "AC_TESTINIUM_RESULT_SUCCESS_SUMMARY";

/// Trait for result sinks
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist the counters of a finished run
    async fn write_summary(&self, summary: &ResultSummary) -> Result<(), WorkflowError>;
}

/// Render the counters as `KEY=value` lines
pub fn render_env_lines(summary: &ResultSummary) -> String {
    format!(
        "{}={}\n{}={}\n{}={}\n",
        FAILURE_KEY, summary.failure, ERROR_KEY, summary.error, SUCCESS_KEY, summary.success
    )
}

/// Appends the counters to the env file shared between CI steps
#[derive(Debug, Clone)]
pub struct EnvFileSink {
    path: PathBuf,
}

impl EnvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultSink for EnvFileSink {
    async fn write_summary(&self, summary: &ResultSummary) -> Result<(), WorkflowError> {
        let to_output_error = |source| WorkflowError::Output {
            path: self.path.clone(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(to_output_error)?;
        file.write_all(render_env_lines(summary).as_bytes())
            .await
            .map_err(to_output_error)?;
        file.flush().await.map_err(to_output_error)?;

        info!("Result counters written to {}", self.path.display());
        Ok(())
    }
}

/// Sink used when no output file is configured
#[derive(Debug, Clone, Default)]
pub struct NullSink;

#[async_trait]
impl ResultSink for NullSink {
    async fn write_summary(&self, summary: &ResultSummary) -> Result<(), WorkflowError> {
        debug!("No output file configured, not persisting {}", summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_env_lines() {
        let lines = render_env_lines(&ResultSummary::new(90, 8, 0));
        assert_eq!(
            lines,
            "AC_TESTINIUM_RESULT_FAILURE_SUMMARY=8\n\
             AC_TESTINIUM_RESULT_ERROR_SUMMARY=0\n\
             AC_TESTINIUM_RESULT_SUCCESS_SUMMARY=90\n"
        );
    }

    #[tokio::test]
    async fn test_env_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env");
        std::fs::write(&path, "AC_EXISTING=1\n").unwrap();

        let sink = EnvFileSink::new(&path);
        sink.write_summary(&ResultSummary::new(5, 1, 2)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("AC_EXISTING=1\n"));
        assert!(content.contains("AC_TESTINIUM_RESULT_FAILURE_SUMMARY=1\n"));
        assert!(content.contains("AC_TESTINIUM_RESULT_ERROR_SUMMARY=2\n"));
        assert!(content.contains("AC_TESTINIUM_RESULT_SUCCESS_SUMMARY=5\n"));
    }

    #[tokio::test]
    async fn test_env_file_sink_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = EnvFileSink::new(dir.path().join("missing").join("env"));

        let err = sink.write_summary(&ResultSummary::default()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Output { .. }));
        assert_eq!(err.exit_code(), 7);
    }

    #[tokio::test]
    async fn test_null_sink_accepts_everything() {
        assert!(NullSink.write_summary(&ResultSummary::new(1, 1, 1)).await.is_ok());
    }
}
