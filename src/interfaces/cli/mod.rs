//! CLI interface module
//!
//! This module provides command-line interface functionality for lead-insights.

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::storage::{StorageFactory, SubmissionStore};
use commands::{config_generate, prune_submissions, show_report};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::LeadInsightsError> for CliError {
    fn from(err: crate::errors::LeadInsightsError) -> Self {
        match err {
            crate::errors::LeadInsightsError::Validation(msg) => CliError::ParseError(msg),
            other => CliError::StorageError(other.to_string()),
        }
    }
}

async fn open_storage(config: &StaticConfig) -> Result<Arc<dyn SubmissionStore>, CliError> {
    StorageFactory::create(&config.database)
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))
}

/// Run a CLI command from clap-parsed input
///
/// `serve` is handled by the runtime and never reaches this function.
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    match cmd {
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force).await,

        Commands::Prune { days } => {
            let storage = open_storage(config).await?;
            prune_submissions(storage, &config.attribution, days).await
        }

        Commands::Report {
            report_type,
            days,
            form,
            output,
        } => {
            let storage = open_storage(config).await?;
            show_report(
                storage,
                Arc::new(config.attribution.clone()),
                &report_type,
                days,
                form,
                output,
            )
            .await
        }

        Commands::Serve => Err(CliError::CommandError(
            "serve is not a CLI command".to_string(),
        )),
    }
}
