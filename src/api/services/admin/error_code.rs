//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::LeadInsightsError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 表单提交错误
/// - 4000-4099: 导出错误
/// - 6000-6099: 报表错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,

    // 表单提交错误 3000-3099
    SubmissionInvalidBody = 3000,
    SubmissionStoreFailed = 3001,

    // 导出错误 4000-4099
    CsvGenerationError = 4006,

    // 报表错误 6000-6099
    ReportQueryFailed = 6000,
    ReportInvalidQuery = 6001,
}

impl From<LeadInsightsError> for ErrorCode {
    fn from(err: LeadInsightsError) -> Self {
        match err {
            LeadInsightsError::Validation(_) => ErrorCode::BadRequest,
            LeadInsightsError::NotFound(_) => ErrorCode::NotFound,
            LeadInsightsError::DatabaseConfig(_)
            | LeadInsightsError::DatabaseConnection(_)
            | LeadInsightsError::DatabaseOperation(_)
            | LeadInsightsError::FileOperation(_)
            | LeadInsightsError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
        assert_eq!(
            serde_json::to_string(&ErrorCode::ReportInvalidQuery).unwrap(),
            "6001"
        );
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ErrorCode::from(LeadInsightsError::validation("bad")),
            ErrorCode::BadRequest
        );
        assert_eq!(
            ErrorCode::from(LeadInsightsError::database_operation("locked")),
            ErrorCode::InternalServerError
        );
    }
}
