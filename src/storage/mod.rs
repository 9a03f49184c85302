use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::{SeaOrmStorage, infer_backend_from_url};
pub use memory::MemoryStorage;
pub use models::{Submission, SubmissionFilter};

/// Persistence for form submissions
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert(&self, submission: &Submission) -> Result<()>;
    /// 覆盖已有提交的 data 字段
    async fn save(&self, submission: &Submission) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Submission>>;
    /// 按创建时间升序返回
    async fn list(&self, filter: SubmissionFilter) -> Result<Vec<Submission>>;
    fn backend_name(&self) -> &str;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn SubmissionStore>> {
        let database_url = &config.database_url;

        // 从 URL 自动推断数据库类型
        let backend_type = infer_backend_from_url(database_url)?;

        let storage: Arc<dyn SubmissionStore> = if backend_type == "memory" {
            Arc::new(MemoryStorage::new())
        } else {
            Arc::new(SeaOrmStorage::new(config, &backend_type).await?)
        };
        Ok(storage)
    }
}
