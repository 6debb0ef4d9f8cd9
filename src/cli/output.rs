//! CLI output formatting

use crate::{
    core::{RunContext, Stage},
    execution::{Verdict, WorkflowEvent},
};
use console::Emoji;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Human-readable stage title
pub fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Authenticate => "Logging in",
        Stage::FindProject => "Looking up project",
        Stage::Upload => "Uploading app",
        Stage::UpdateProject => "Updating project",
        Stage::WaitForIdle => "Waiting for previous runs",
        Stage::TriggerRun => "Starting plan",
        Stage::WaitForCompletion => "Checking the status of plan",
        Stage::FetchReport => "Fetching report",
        Stage::Evaluate => "Evaluating results",
    }
}

/// Format a verdict for display
pub fn format_verdict(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Passed { failure_percentage } => format!(
            "{} (failure rate {:.2}%)",
            style("passed").green(),
            failure_percentage
        ),
        Verdict::PassedWithoutThreshold => format!(
            "{} (failure threshold not evaluated)",
            style("passed").green()
        ),
        Verdict::Failed { reason } => format!("{}: {}", style("failed").red(), reason),
    }
}

/// Format a workflow event for display
pub fn format_workflow_event(event: &WorkflowEvent) -> String {
    match event {
        WorkflowEvent::RunStarted { run_id, plan_id } => format!(
            "{} Running plan {} ({})",
            ROCKET,
            style(plan_id).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        WorkflowEvent::StageStarted { stage } => {
            format!("{} {}...", SPINNER, style(stage_title(*stage)).cyan())
        }
        WorkflowEvent::StageCompleted {
            stage,
            attempts,
            detail,
        } => {
            let mut line = format!("{} {}", CHECK, style(stage_title(*stage)).green());
            if *attempts > 1 {
                line.push_str(&format!(" {}", style(format!("(attempt {})", attempts)).dim()));
            }
            if let Some(detail) = detail {
                line.push_str(&format!(": {}", detail));
            }
            line
        }
        WorkflowEvent::StageFailed { stage, error } => match stage {
            Some(stage) => format!(
                "{} {}: {}",
                CROSS,
                style(stage_title(*stage)).red(),
                style(error).dim()
            ),
            None => format!("{} {}", CROSS, style(error).red()),
        },
        WorkflowEvent::PlanStillRunning { polls, .. } => format!(
            "{} Plan is still running... {}",
            INFO,
            style(format!("(check {})", polls)).dim()
        ),
        WorkflowEvent::ReportFetched { summary } => format!(
            "{} Results: {} succeeded, {} failed, {} errored",
            INFO,
            style(summary.success).green(),
            style(summary.failure).red(),
            style(summary.error).yellow()
        ),
        WorkflowEvent::RunFinished { run_id, verdict } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_verdict(verdict)
        ),
    }
}

/// Format the per-stage breakdown of a run
pub fn format_stage_table(ctx: &RunContext) -> String {
    ctx.stages
        .iter()
        .map(|record| {
            let elapsed = record
                .completed_at
                .signed_duration_since(record.started_at)
                .to_std()
                .unwrap_or_default();
            format!(
                "  {:<22} {:>2} attempt(s) {:>10}",
                record.stage.as_str(),
                record.attempts,
                format_duration(elapsed)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
