//! Core domain models
//!
//! This module defines the configuration, run state and remote data
//! structures shared by the API client and the workflow engine.

pub mod config;
pub mod context;
pub mod error;
pub mod project;
pub mod report;
pub mod state;

pub use config::*;
pub use context::*;
pub use error::WorkflowError;
pub use project::*;
pub use report::ResultSummary;
pub use state::*;
