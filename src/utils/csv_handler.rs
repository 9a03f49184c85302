//! CSV 导出共享逻辑
//!
//! 报表 CSV 由 Web Admin 和 CLI 共用

use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::attribution::share_percent;
use crate::errors::{LeadInsightsError, Result};
use crate::services::Report;

/// 报表 CSV 行
#[derive(Debug, Clone, Serialize)]
pub struct ReportCsvRow<'a> {
    #[serde(rename = "Label")]
    pub label: &'a str,
    #[serde(rename = "Leads")]
    pub leads: u64,
    #[serde(rename = "Share %")]
    pub share: String,
}

/// 写出报表（表头 Label,Leads,Share %）
pub fn write_report_csv<W: Write>(writer: W, report: &Report) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    // 无数据行时也要输出表头
    csv_writer.write_record(["Label", "Leads", "Share %"])?;

    for row in &report.rows {
        let csv_row = ReportCsvRow {
            label: &row.label,
            leads: row.count,
            share: format!("{:.1}", share_percent(row.count, report.total)),
        };
        csv_writer.serialize(&csv_row).map_err(|e| {
            LeadInsightsError::serialization(format!("Failed to write CSV row: {}", e))
        })?;
    }

    csv_writer
        .flush()
        .map_err(|e| LeadInsightsError::file_operation(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}

/// 报表 CSV 字节（HTTP 下载用）
pub fn report_to_csv_bytes(report: &Report) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_report_csv(&mut buffer, report)?;
    Ok(buffer)
}

/// 导出报表到 CSV 文件
pub fn export_report_to_file<P: AsRef<Path>>(report: &Report, path: P) -> Result<()> {
    let file = File::create(path.as_ref())
        .map_err(|e| LeadInsightsError::file_operation(format!("Failed to create file: {}", e)))?;
    write_report_csv(BufWriter::new(file), report)
}
