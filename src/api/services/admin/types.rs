//! API 类型定义

use serde::{Deserialize, Serialize};

/// 统一响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 报表查询参数
///
/// `days` 以字符串接收，便于返回统一的 400 错误
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ReportParams {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub days: Option<String>,
    pub form: Option<String>,
}

/// 表单提交成功响应
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubmissionCreated {
    pub id: String,
}
