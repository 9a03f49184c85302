use serde_json::{Map, Value};

use crate::errors::{LeadInsightsError, Result};
use crate::storage::Submission;
use migration::entities::form_submission;

/// 将 Sea-ORM Model 转换为 Submission
pub fn model_to_submission(model: form_submission::Model) -> Result<Submission> {
    let data: Map<String, Value> = match serde_json::from_str(&model.data)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(LeadInsightsError::serialization(format!(
                "Submission {} data is not a JSON object: {}",
                model.id, other
            )));
        }
    };

    Ok(Submission {
        id: model.id,
        form_handle: model.form_handle,
        created_at: model.created_at,
        data,
    })
}

/// 将 Submission 转换为 ActiveModel（用于插入/更新）
pub fn submission_to_active_model(
    submission: &Submission,
    is_new: bool,
) -> Result<form_submission::ActiveModel> {
    use sea_orm::ActiveValue::*;

    let data = serde_json::to_string(&submission.data)?;

    Ok(form_submission::ActiveModel {
        id: Set(submission.id.clone()),
        form_handle: if is_new {
            Set(submission.form_handle.clone())
        } else {
            NotSet
        },
        created_at: if is_new {
            Set(submission.created_at)
        } else {
            NotSet
        },
        data: Set(data),
    })
}
