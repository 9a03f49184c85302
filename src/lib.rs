//! Lead Insights - marketing attribution for website form submissions
//!
//! Captures UTM parameters, referrer and landing page for visitors who have
//! given consent, attaches that snapshot to form submissions, and reports
//! which channels produce leads.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `attribution`: Consent gate, merge rules, aggregation, retention
//! - `storage`: Submission storage backends (SeaORM, in-memory)
//! - `services`: Attribution, report and prune services
//! - `api`: HTTP services and middleware
//! - `interfaces`: Command-line interface
//! - `config`: Configuration loading
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod api;
pub mod attribution;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
