//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::model_to_submission;
use crate::errors::{LeadInsightsError, Result};
use crate::storage::{Submission, SubmissionFilter};

use migration::entities::form_submission;

impl SeaOrmStorage {
    pub(super) async fn find_submission(&self, id: &str) -> Result<Option<Submission>> {
        let model = form_submission::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| LeadInsightsError::database_operation(format!("查询提交失败: {}", e)))?;

        model.map(model_to_submission).transpose()
    }

    pub(super) async fn list_filtered(&self, filter: SubmissionFilter) -> Result<Vec<Submission>> {
        // 构建查询条件
        let mut condition = Condition::all();

        if let Some(ref handle) = filter.form_handle {
            condition = condition.add(form_submission::Column::FormHandle.eq(handle.as_str()));
        }

        // created_after
        if let Some(after) = filter.created_after {
            condition = condition.add(form_submission::Column::CreatedAt.gte(after));
        }

        // created_before
        if let Some(before) = filter.created_before {
            condition = condition.add(form_submission::Column::CreatedAt.lt(before));
        }

        let models = form_submission::Entity::find()
            .filter(condition)
            .order_by_asc(form_submission::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LeadInsightsError::database_operation(format!("查询提交列表失败: {}", e)))?;

        debug!("Loaded {} submissions for filter {:?}", models.len(), filter);
        models.into_iter().map(model_to_submission).collect()
    }
}
