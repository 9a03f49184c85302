//! Report command

use chrono::Utc;
use colored::Colorize;
use std::sync::Arc;

use crate::attribution::share_percent;
use crate::config::AttributionConfig;
use crate::interfaces::cli::CliError;
use crate::services::{Report, ReportQuery, ReportService, ReportType};
use crate::storage::SubmissionStore;
use crate::utils::export_report_to_file;

pub async fn show_report(
    storage: Arc<dyn SubmissionStore>,
    config: Arc<AttributionConfig>,
    report_type: &str,
    days: Option<i64>,
    form: Option<String>,
    output: Option<String>,
) -> Result<(), CliError> {
    let report_type = ReportType::parse(report_type)?;
    let service = ReportService::new(storage, config);
    let days = service.resolve_days(days)?;

    let query = ReportQuery {
        report_type,
        days: Some(days),
        form,
    };
    let report = service.run(&query, Utc::now()).await?;

    match output {
        Some(path) => {
            export_report_to_file(&report, &path)
                .map_err(|e| CliError::CommandError(format!("Failed to write CSV: {}", e)))?;
            println!(
                "{} {} {}",
                "✓".bold().green(),
                "Report written to".green(),
                path.blue()
            );
        }
        None => print_table(report_type, days, &report),
    }
    Ok(())
}

fn print_table(report_type: ReportType, days: i64, report: &Report) {
    println!(
        "{}",
        format!("Leads by {} (last {} days)", report_type.as_ref(), days)
            .bold()
            .green()
    );
    println!();

    if report.rows.is_empty() {
        println!("{} No submissions in range", "ℹ".bold().blue());
        return;
    }

    let width = report
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    println!("  {:<width$}  {:>6}  {:>7}", "Label", "Leads", "Share %");
    for row in &report.rows {
        println!(
            "  {:<width$}  {:>6}  {:>7}",
            row.label.cyan(),
            row.count,
            format!("{:.1}", share_percent(row.count, report.total))
        );
    }
    println!();
    println!(
        "{} Total {} submission(s)",
        "ℹ".bold().blue(),
        report.total.to_string().green()
    );
}
