//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::submission_to_active_model;
use crate::errors::{LeadInsightsError, Result};
use crate::storage::Submission;

use migration::entities::form_submission;

impl SeaOrmStorage {
    pub(super) async fn insert_submission(&self, submission: &Submission) -> Result<()> {
        let model = submission_to_active_model(submission, true)?;

        form_submission::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| LeadInsightsError::database_operation(format!("保存提交失败: {}", e)))?;

        debug!(
            "Submission {} stored for form '{}'",
            submission.id, submission.form_handle
        );
        Ok(())
    }

    pub(super) async fn update_data(&self, submission: &Submission) -> Result<()> {
        let model = submission_to_active_model(submission, false)?;

        let result = form_submission::Entity::update_many()
            .set(model)
            .filter(form_submission::Column::Id.eq(submission.id.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| LeadInsightsError::database_operation(format!("更新提交失败: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LeadInsightsError::not_found(format!(
                "提交不存在: {}",
                submission.id
            )));
        }
        Ok(())
    }
}
