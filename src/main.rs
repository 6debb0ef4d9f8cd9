use anyhow::{Context, Result};
use testinium_pipeline::api::TestiniumHttpClient;
use testinium_pipeline::cli::commands::ResolvedSettings;
use testinium_pipeline::cli::output::*;
use testinium_pipeline::cli::{parse_failure, Cli};
use testinium_pipeline::core::{RunContext, WorkflowError};
use testinium_pipeline::execution::{exit_code, WorkflowOrchestrator};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_from_args() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(parse_failure(&err).map_or(0, |failure| failure.exit_code()));
        }
    };

    if let Err(err) = init_logging(cli.verbose) {
        std::process::exit(report_failure(&WorkflowError::Config(format!("{:#}", err))));
    }

    let code = run(&cli).await;
    std::process::exit(code);
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")
}

async fn run(cli: &Cli) -> i32 {
    let settings = match cli.settings.resolve() {
        Ok(settings) => settings,
        Err(err) => return report_failure(&err),
    };

    if cli.validate {
        print_settings(&settings);
        return 0;
    }

    let client = match TestiniumHttpClient::new(settings.api) {
        Ok(client) => client,
        Err(err) => {
            return report_failure(&WorkflowError::Config(format!(
                "cannot create HTTP client: {}",
                err
            )))
        }
    };

    let mut orchestrator = WorkflowOrchestrator::new(client, settings.run);
    orchestrator.add_event_handler(|event| println!("{}", format_workflow_event(event)));

    let mut ctx = RunContext::new();
    let result = orchestrator.run(&mut ctx).await;

    if !ctx.stages.is_empty() {
        println!("\n{}", format_stage_table(&ctx));
    }

    match &result {
        Ok(verdict) => println!(
            "\n{} Plan execution was successful: {}",
            CHECK,
            format_verdict(verdict)
        ),
        Err(err) => {
            report_failure(err);
        }
    }

    exit_code(&result)
}

fn report_failure(err: &WorkflowError) -> i32 {
    let headline = if err.is_test_failure() {
        "Plan execution was not successful"
    } else {
        "Pipeline step failed"
    };
    eprintln!("\n{} {}", CROSS, style(headline).red().bold());
    eprintln!("  {}", style(err).red());
    err.exit_code()
}

fn print_settings(settings: &ResolvedSettings) {
    let run = &settings.run;
    println!("{} Configuration is valid!", CHECK);
    println!("  App: {}", style(run.app_path.display()).bold());
    println!("  Platform: {}", style(run.platform).cyan());
    println!("  Plan: {}  Project: {}", style(&run.plan_id).cyan(), style(&run.project_id).cyan());
    println!(
        "  Timeout: {}  Attempts per call: {}  Poll interval: {}",
        style(format_duration(run.timeout)).cyan(),
        style(run.max_attempts).cyan(),
        style(format_duration(run.poll_interval)).cyan()
    );
    if run.max_failure_percentage > 0 {
        println!("  Max fail percentage: {}%", style(run.max_failure_percentage).cyan());
    } else {
        println!("  {} Failure threshold disabled", WARN);
    }
    match &run.output_file {
        Some(path) => println!("  Output file: {}", style(path.display()).dim()),
        None => println!("  {} No output file, result counters will not be persisted", INFO),
    }
    println!("  API: {}", style(&settings.api.api_url).dim());
}
