//! SeaORM storage backend
//!
//! This module provides submission storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{LeadInsightsError, Result};
use crate::storage::{Submission, SubmissionFilter, SubmissionStore};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_submission, submission_to_active_model};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("memory://") {
        Ok("memory".to_string())
    } else if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LeadInsightsError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://, memory://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig, backend_name: &str) -> Result<Self> {
        let database_url = &config.database_url;
        if database_url.is_empty() {
            return Err(LeadInsightsError::database_config(
                "database_url 未设置".to_string(),
            ));
        }

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(config, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl SubmissionStore for SeaOrmStorage {
    async fn insert(&self, submission: &Submission) -> Result<()> {
        self.insert_submission(submission).await
    }

    async fn save(&self, submission: &Submission) -> Result<()> {
        self.update_data(submission).await
    }

    async fn get(&self, id: &str) -> Result<Option<Submission>> {
        self.find_submission(id).await
    }

    async fn list(&self, filter: SubmissionFilter) -> Result<Vec<Submission>> {
        self.list_filtered(filter).await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(
            infer_backend_from_url("sqlite://lead_insights.db?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("leads.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mariadb://root@localhost/leads").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://localhost/leads").unwrap(),
            "postgres"
        );
        assert_eq!(infer_backend_from_url("memory://").unwrap(), "memory");

        let err = infer_backend_from_url("redis://localhost").unwrap_err();
        assert!(matches!(err, LeadInsightsError::DatabaseConfig(_)));
    }
}
