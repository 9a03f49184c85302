//! Service layer for business logic
//!
//! This module provides business logic shared between the HTTP API and the
//! CLI.

mod attribution_service;
mod prune_task;
mod report_service;

pub use attribution_service::*;
pub use prune_task::*;
pub use report_service::*;
