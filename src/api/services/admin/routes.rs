//! Admin API 路由配置

use actix_web::web;

use super::reports::{export_report, get_report};

/// 报表路由 `/reports`
///
/// 包含：
/// - GET/HEAD /reports - 获取报表
/// - GET /reports/export - 导出 CSV
pub fn reports_routes() -> actix_web::Scope {
    web::scope("/reports")
        .route("", web::get().to(get_report))
        .route("", web::head().to(get_report))
        .route("/export", web::get().to(export_report))
}

/// 挂载在 admin 前缀下的全部路由
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.service(reports_routes());
}
