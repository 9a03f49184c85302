use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum LeadInsightsError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
}

impl LeadInsightsError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LeadInsightsError::DatabaseConfig(_) => "E001",
            LeadInsightsError::DatabaseConnection(_) => "E002",
            LeadInsightsError::DatabaseOperation(_) => "E003",
            LeadInsightsError::FileOperation(_) => "E004",
            LeadInsightsError::Validation(_) => "E005",
            LeadInsightsError::NotFound(_) => "E006",
            LeadInsightsError::Serialization(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LeadInsightsError::DatabaseConfig(_) => "Database Configuration Error",
            LeadInsightsError::DatabaseConnection(_) => "Database Connection Error",
            LeadInsightsError::DatabaseOperation(_) => "Database Operation Error",
            LeadInsightsError::FileOperation(_) => "File Operation Error",
            LeadInsightsError::Validation(_) => "Validation Error",
            LeadInsightsError::NotFound(_) => "Resource Not Found",
            LeadInsightsError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LeadInsightsError::DatabaseConfig(msg)
            | LeadInsightsError::DatabaseConnection(msg)
            | LeadInsightsError::DatabaseOperation(msg)
            | LeadInsightsError::FileOperation(msg)
            | LeadInsightsError::Validation(msg)
            | LeadInsightsError::NotFound(msg)
            | LeadInsightsError::Serialization(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            LeadInsightsError::Validation(_) => StatusCode::BAD_REQUEST,
            LeadInsightsError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LeadInsightsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LeadInsightsError {}

// 便捷的构造函数
impl LeadInsightsError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LeadInsightsError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LeadInsightsError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LeadInsightsError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LeadInsightsError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LeadInsightsError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LeadInsightsError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LeadInsightsError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LeadInsightsError {
    fn from(err: sea_orm::DbErr) -> Self {
        LeadInsightsError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LeadInsightsError {
    fn from(err: std::io::Error) -> Self {
        LeadInsightsError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LeadInsightsError {
    fn from(err: serde_json::Error) -> Self {
        LeadInsightsError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for LeadInsightsError {
    fn from(err: csv::Error) -> Self {
        LeadInsightsError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LeadInsightsError>;
