//! 报表端点
//!
//! - GET /reports?type=&days=&form= - JSON 报表
//! - GET /reports/export?type=&days=&form= - CSV 下载

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use chrono::Utc;
use tracing::{error, info};

use crate::errors::{LeadInsightsError, Result};
use crate::services::{ReportQuery, ReportService, ReportType};
use crate::utils::report_to_csv_bytes;

use super::error_code::ErrorCode;
use super::helpers::{error_from_lead_insights, error_response, success_response};
use super::types::ReportParams;

/// 将查询参数转换为 ReportQuery，type 为必填
fn parse_params(params: &ReportParams) -> Result<ReportQuery> {
    let report_type = match params.report_type.as_deref() {
        Some(raw) if !raw.trim().is_empty() => ReportType::parse(raw)?,
        _ => return Err(LeadInsightsError::validation("type is required")),
    };

    let days = match params.days.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<i64>().map_err(|_| {
            LeadInsightsError::validation(format!("Invalid days: '{}'. Expected an integer", raw))
        })?),
        _ => None,
    };

    Ok(ReportQuery {
        report_type,
        days,
        form: params.form.clone(),
    })
}

fn invalid_query(err: &LeadInsightsError) -> HttpResponse {
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::ReportInvalidQuery,
        err.message(),
    )
}

/// 获取报表
pub async fn get_report(
    query: web::Query<ReportParams>,
    report_service: web::Data<Arc<ReportService>>,
) -> ActixResult<impl Responder> {
    info!("Admin API: report request {:?}", query);

    let report_query = match parse_params(&query) {
        Ok(q) => q,
        Err(e) => return Ok(invalid_query(&e)),
    };

    match report_service.run(&report_query, Utc::now()).await {
        Ok(report) => Ok(success_response(report)),
        Err(e @ LeadInsightsError::Validation(_)) => Ok(invalid_query(&e)),
        Err(e) => {
            error!("Admin API: report query failed: {}", e);
            Ok(error_from_lead_insights(&e))
        }
    }
}

/// 导出报表 CSV
pub async fn export_report(
    query: web::Query<ReportParams>,
    report_service: web::Data<Arc<ReportService>>,
) -> ActixResult<impl Responder> {
    info!("Admin API: report export {:?}", query);

    let report_query = match parse_params(&query) {
        Ok(q) => q,
        Err(e) => return Ok(invalid_query(&e)),
    };
    let days = match report_service.resolve_days(report_query.days) {
        Ok(days) => days,
        Err(e) => return Ok(invalid_query(&e)),
    };

    let report = match report_service.run(&report_query, Utc::now()).await {
        Ok(report) => report,
        Err(e @ LeadInsightsError::Validation(_)) => return Ok(invalid_query(&e)),
        Err(e) => {
            error!("Admin API: report export failed: {}", e);
            return Ok(error_from_lead_insights(&e));
        }
    };

    let csv = match report_to_csv_bytes(&report) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Admin API: CSV generation failed: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::CsvGenerationError,
                "Failed to generate CSV",
            ));
        }
    };

    let filename = ReportService::export_filename(report_query.report_type, days);
    info!("Admin API: exporting {} ({} rows)", filename, report.rows.len());

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(csv))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(report_type: Option<&str>, days: Option<&str>, form: Option<&str>) -> ReportParams {
        ReportParams {
            report_type: report_type.map(str::to_string),
            days: days.map(str::to_string),
            form: form.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_params_requires_type() {
        assert!(parse_params(&params(None, None, None)).is_err());
        assert!(parse_params(&params(Some("  "), Some("7"), None)).is_err());

        let query = parse_params(&params(Some("source"), None, None)).unwrap();
        assert_eq!(query.report_type, ReportType::Source);
        assert_eq!(query.days, None);
    }

    #[test]
    fn test_parse_params_values() {
        let query = parse_params(&params(Some("form_source"), Some("7"), Some("contact"))).unwrap();
        assert_eq!(query.report_type, ReportType::FormSource);
        assert_eq!(query.days, Some(7));
        assert_eq!(query.form.as_deref(), Some("contact"));
    }

    #[test]
    fn test_parse_params_rejects_garbage() {
        assert!(parse_params(&params(Some("devices"), None, None)).is_err());
        assert!(parse_params(&params(None, Some("seven"), None)).is_err());
    }
}
