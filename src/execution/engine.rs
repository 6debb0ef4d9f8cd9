//! Workflow orchestrator - sequences the pipeline stages

use crate::{
    api::{ProjectUpdate, TestiniumApi},
    core::{
        AccessToken, ResultSummary, RunConfig, RunContext, Stage, UploadedFile, WorkflowError,
    },
    execution::{
        poll::{poll_until_idle, PollSummary},
        retry::{retry_call, RetryOutput},
        threshold::{ThresholdEvaluator, Verdict},
        DeadlineGuard,
    },
    persistence::{EnvFileSink, NullSink, ResultSink},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    RunStarted {
        run_id: Uuid,
        plan_id: String,
    },
    StageStarted {
        stage: Stage,
    },
    StageCompleted {
        stage: Stage,
        attempts: usize,
        detail: Option<String>,
    },
    StageFailed {
        stage: Option<Stage>,
        error: String,
    },
    PlanStillRunning {
        stage: Stage,
        polls: usize,
    },
    ReportFetched {
        summary: ResultSummary,
    },
    RunFinished {
        run_id: Uuid,
        verdict: Verdict,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&WorkflowEvent) + Send + Sync>;

/// Process exit code for the result of a run
pub fn exit_code(result: &Result<Verdict, WorkflowError>) -> i32 {
    match result {
        Ok(verdict) if verdict.is_pass() => 0,
        Ok(_) => 1,
        Err(err) => err.exit_code(),
    }
}

/// Drives one run through every stage
///
/// Stages run strictly in order. The first failure ends the run and no
/// later stage starts.
pub struct WorkflowOrchestrator<A> {
    api: A,
    config: RunConfig,
    sink: Arc<dyn ResultSink>,
    event_handlers: Vec<EventHandler>,
}

impl<A: TestiniumApi> WorkflowOrchestrator<A> {
    /// Create an orchestrator that writes results to the configured output file
    pub fn new(api: A, config: RunConfig) -> Self {
        let sink: Arc<dyn ResultSink> = match &config.output_file {
            Some(path) => Arc::new(EnvFileSink::new(path)),
            None => Arc::new(NullSink),
        };

        Self {
            api,
            config,
            sink,
            event_handlers: Vec::new(),
        }
    }

    /// Replace the result sink
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&WorkflowEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit(&self, event: WorkflowEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Execute a run with a fresh context
    pub async fn execute(&self) -> Result<Verdict, WorkflowError> {
        let mut ctx = RunContext::new();
        self.run(&mut ctx).await
    }

    /// Execute every stage, filling `ctx` along the way
    ///
    /// The deadline starts counting when this is called.
    pub async fn run(&self, ctx: &mut RunContext) -> Result<Verdict, WorkflowError> {
        info!(
            "Starting run {} for plan {} (timeout {}s, {} attempts per stage)",
            ctx.run_id,
            self.config.plan_id,
            self.config.timeout.as_secs(),
            self.config.max_attempts
        );
        self.emit(WorkflowEvent::RunStarted {
            run_id: ctx.run_id,
            plan_id: self.config.plan_id.clone(),
        });

        let deadline = DeadlineGuard::after(self.config.timeout);
        let result = self.run_stages(ctx, &deadline).await;

        if let Err(err) = &result {
            error!("Run {} failed: {}", ctx.run_id, err);
            self.emit(WorkflowEvent::StageFailed {
                stage: err.stage(),
                error: err.to_string(),
            });
        }

        result
    }

    async fn run_stages(
        &self,
        ctx: &mut RunContext,
        deadline: &DeadlineGuard,
    ) -> Result<Verdict, WorkflowError> {
        self.authenticate(ctx, deadline).await?;
        self.find_project(ctx, deadline).await?;
        self.upload(ctx, deadline).await?;
        self.update_project(ctx, deadline).await?;
        self.wait_until_idle(ctx, Stage::WaitForIdle, deadline).await?;
        self.trigger_run(ctx, deadline).await?;
        self.wait_until_idle(ctx, Stage::WaitForCompletion, deadline).await?;
        self.fetch_report(ctx, deadline).await?;
        self.evaluate(ctx).await
    }

    fn start_stage(&self, stage: Stage) -> DateTime<Utc> {
        info!("Stage {} started", stage);
        self.emit(WorkflowEvent::StageStarted { stage });
        Utc::now()
    }

    fn finish_stage(
        &self,
        ctx: &mut RunContext,
        stage: Stage,
        attempts: usize,
        started_at: DateTime<Utc>,
        detail: Option<String>,
    ) {
        info!("Stage {} completed after {} attempt(s)", stage, attempts);
        ctx.record_stage(stage, attempts, started_at);
        self.emit(WorkflowEvent::StageCompleted {
            stage,
            attempts,
            detail,
        });
    }

    async fn authenticate(
        &self,
        ctx: &mut RunContext,
        deadline: &DeadlineGuard,
    ) -> Result<(), WorkflowError> {
        let stage = Stage::Authenticate;
        let started_at = self.start_stage(stage);
        let credentials = &self.config.credentials;

        let RetryOutput { value, attempts } =
            retry_call(stage, self.config.max_attempts, deadline, || {
                self.api.authenticate(credentials)
            })
            .await?;

        let token = value
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(WorkflowError::MissingRequiredField {
                stage,
                field: "access_token",
            })?;
        ctx.access_token = Some(AccessToken::new(token));

        self.finish_stage(ctx, stage, attempts, started_at, None);
        Ok(())
    }

    async fn find_project(
        &self,
        ctx: &mut RunContext,
        deadline: &DeadlineGuard,
    ) -> Result<(), WorkflowError> {
        let stage = Stage::FindProject;
        let started_at = self.start_stage(stage);
        let token = ctx.access_token(stage)?.clone();
        let project_id = &self.config.project_id;

        let RetryOutput { value, attempts } =
            retry_call(stage, self.config.max_attempts, deadline, || {
                self.api.find_project(project_id, &token)
            })
            .await?;

        let detail = format!("Found {}", value.display_name());
        ctx.project = Some(value);

        self.finish_stage(ctx, stage, attempts, started_at, Some(detail));
        Ok(())
    }

    async fn upload(
        &self,
        ctx: &mut RunContext,
        deadline: &DeadlineGuard,
    ) -> Result<(), WorkflowError> {
        let stage = Stage::Upload;
        let started_at = self.start_stage(stage);
        let token = ctx.access_token(stage)?.clone();
        let app_path = self.config.app_path.as_path();

        info!("Uploading {}", self.config.app_file_name());
        let RetryOutput { value, attempts } =
            retry_call(stage, self.config.max_attempts, deadline, || {
                self.api.upload(app_path, &token)
            })
            .await?;

        let file_token = value
            .file_token
            .filter(|token| !token.is_empty())
            .ok_or(WorkflowError::MissingRequiredField {
                stage,
                field: "file_token",
            })?;
        let detail = format!(
            "{} uploaded (file token {})",
            self.config.app_file_name(),
            file_token
        );
        ctx.uploaded_file = Some(UploadedFile {
            file_token,
            meta_data: value.meta_data,
        });

        self.finish_stage(ctx, stage, attempts, started_at, Some(detail));
        Ok(())
    }

    async fn update_project(
        &self,
        ctx: &mut RunContext,
        deadline: &DeadlineGuard,
    ) -> Result<(), WorkflowError> {
        let stage = Stage::UpdateProject;
        let started_at = self.start_stage(stage);
        let token = ctx.access_token(stage)?.clone();
        let update = ProjectUpdate::for_upload(
            ctx.project(stage)?,
            self.config.platform,
            &self.config.app_file_name(),
            ctx.uploaded_file(stage)?,
        );

        let RetryOutput { value, attempts } =
            retry_call(stage, self.config.max_attempts, deadline, || {
                self.api.update_project(&update, &token)
            })
            .await?;

        let detail = format!(
            "{} now uses the uploaded {} build",
            value.display_name(),
            self.config.platform
        );
        ctx.project = Some(value);

        self.finish_stage(ctx, stage, attempts, started_at, Some(detail));
        Ok(())
    }

    async fn wait_until_idle(
        &self,
        ctx: &mut RunContext,
        stage: Stage,
        deadline: &DeadlineGuard,
    ) -> Result<PollSummary, WorkflowError> {
        let started_at = self.start_stage(stage);
        let token = ctx.access_token(stage)?.clone();
        let plan_id = &self.config.plan_id;

        let summary = poll_until_idle(
            stage,
            self.config.poll_interval,
            self.config.max_attempts,
            deadline,
            || self.api.is_running(plan_id, &token),
            |polls| {
                info!("Plan {} is still running...", plan_id);
                self.emit(WorkflowEvent::PlanStillRunning { stage, polls });
            },
        )
        .await?;

        let detail = match stage {
            Stage::WaitForCompletion => "Execution finished".to_string(),
            _ => "Plan is idle".to_string(),
        };
        self.finish_stage(ctx, stage, summary.attempts, started_at, Some(detail));
        Ok(summary)
    }

    async fn trigger_run(
        &self,
        ctx: &mut RunContext,
        deadline: &DeadlineGuard,
    ) -> Result<(), WorkflowError> {
        let stage = Stage::TriggerRun;
        let started_at = self.start_stage(stage);
        let token = ctx.access_token(stage)?.clone();
        let plan_id = &self.config.plan_id;

        let RetryOutput { value, attempts } =
            retry_call(stage, self.config.max_attempts, deadline, || {
                self.api.trigger_run(plan_id, &token)
            })
            .await?;

        let execution_id = match (value.execution_id(), &value.execution_id) {
            (Some(id), _) => id,
            (None, Some(raw)) if !raw.is_null() && raw.as_str() != Some("") => {
                return Err(WorkflowError::MalformedResponse {
                    stage,
                    message: format!("unexpected execution id {}", raw),
                })
            }
            (None, _) => {
                return Err(WorkflowError::MissingRequiredField {
                    stage,
                    field: "execution_id",
                })
            }
        };
        let detail = format!("Plan started successfully. Execution Id: {}", execution_id);
        ctx.execution_id = Some(execution_id);

        self.finish_stage(ctx, stage, attempts, started_at, Some(detail));
        Ok(())
    }

    async fn fetch_report(
        &self,
        ctx: &mut RunContext,
        deadline: &DeadlineGuard,
    ) -> Result<(), WorkflowError> {
        let stage = Stage::FetchReport;
        let started_at = self.start_stage(stage);
        let token = ctx.access_token(stage)?.clone();
        let execution_id = ctx.execution_id(stage)?.to_string();

        let RetryOutput { value, attempts } =
            retry_call(stage, self.config.max_attempts, deadline, || {
                self.api.fetch_report(&execution_id, &token)
            })
            .await?;

        let summary = value.result_summary;
        info!("Execution {} finished with {}", execution_id, summary);
        ctx.result_summary = Some(summary);
        self.emit(WorkflowEvent::ReportFetched { summary });

        self.finish_stage(ctx, stage, attempts, started_at, None);
        Ok(())
    }

    /// Persist the counters, then decide pass/fail
    async fn evaluate(&self, ctx: &mut RunContext) -> Result<Verdict, WorkflowError> {
        let stage = Stage::Evaluate;
        let started_at = self.start_stage(stage);
        let summary = ctx.result_summary.ok_or(WorkflowError::MissingRequiredField {
            stage,
            field: "result_summary",
        })?;

        self.sink.write_summary(&summary).await?;

        let verdict =
            ThresholdEvaluator::new(self.config.max_failure_percentage).evaluate(&summary)?;
        self.finish_stage(ctx, stage, 1, started_at, None);
        self.emit(WorkflowEvent::RunFinished {
            run_id: ctx.run_id,
            verdict: verdict.clone(),
        });

        match verdict {
            Verdict::Failed { reason } => Err(WorkflowError::ThresholdFailure { reason, summary }),
            passed => Ok(passed),
        }
    }
}
