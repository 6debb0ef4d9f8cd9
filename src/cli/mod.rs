//! Command-line interface

pub mod commands;
pub mod output;

use crate::core::WorkflowError;
use clap::error::ErrorKind;
use clap::Parser;
use commands::SettingsArgs;
use std::ffi::OsString;

/// Upload an app build to Testinium, run a test plan and evaluate its report
#[derive(Debug, Parser, Clone)]
#[command(name = "testinium-pipeline")]
#[command(author = "Pipeline Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Run a Testinium test plan against a freshly built app", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Only resolve and validate the inputs, without calling the API
    #[arg(long)]
    pub validate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn try_from_args() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

/// Classify a parse error
///
/// Help and version requests are not failures and yield `None`.
pub fn parse_failure(err: &clap::Error) -> Option<WorkflowError> {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => None,
        _ => Some(WorkflowError::Config(err.kind().to_string())),
    }
}
