//! Admin API 服务模块
//!
//! 该模块包含管理 API 的端点：
//! - 归因报表（JSON）
//! - 报表 CSV 导出

pub mod error_code;
mod helpers;
mod reports;
pub mod routes;
mod types;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    api_result, error_from_lead_insights, error_response, json_response, success_response,
};

// 重新导出错误码
pub use error_code::ErrorCode;

// 重新导出报表端点
pub use reports::{export_report, get_report};
