//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for lead-insights using clap's derive macros.

use clap::{Parser, Subcommand};

/// Lead Insights - marketing attribution for form submissions
#[derive(Parser)]
#[command(name = "lead-insights")]
#[command(version)]
#[command(about = "Marketing attribution for form submissions", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Strip attribution data from old submissions
    Prune {
        /// Retention in days (default: attribution.retention_days)
        #[arg(long)]
        days: Option<i64>,
    },

    /// Print a lead report, or write it as CSV
    Report {
        /// Report type: source, campaign, form, form_source
        #[arg(long = "type", short = 't', default_value = "source")]
        report_type: String,

        /// Date range in days (default: attribution.default_date_range_days)
        #[arg(long)]
        days: Option<i64>,

        /// Form handle (required for form_source)
        #[arg(long)]
        form: Option<String>,

        /// Write CSV to this file instead of printing a table
        #[arg(long, short = 'o')]
        output: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
