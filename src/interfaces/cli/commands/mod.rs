//! CLI command implementations

mod config_gen;
mod prune;
mod report;

pub use config_gen::config_generate;
pub use prune::prune_submissions;
pub use report::show_report;
