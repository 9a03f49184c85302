use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attribution::{AttributionRecord, ReportEntry};

/// A stored form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub form_handle: String,
    pub created_at: DateTime<Utc>,
    /// 提交的字段（含归因快照）
    pub data: Map<String, Value>,
}

impl Submission {
    pub fn new(form_handle: impl Into<String>, data: Map<String, Value>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            form_handle: form_handle.into(),
            created_at,
            data,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Attribution snapshot stored under `key`, if any
    pub fn attribution(&self, key: &str) -> Option<AttributionRecord> {
        self.get(key).and_then(AttributionRecord::from_value)
    }

    pub fn report_entry(&self, key: &str) -> ReportEntry {
        ReportEntry {
            form_handle: self.form_handle.clone(),
            attribution: self.attribution(key),
        }
    }
}

/// Submission list filter
#[derive(Default, Clone, Debug)]
pub struct SubmissionFilter {
    pub form_handle: Option<String>,
    /// 创建时间 >= created_after
    pub created_after: Option<DateTime<Utc>>,
    /// 创建时间 < created_before
    pub created_before: Option<DateTime<Utc>>,
}

impl SubmissionFilter {
    pub fn matches(&self, submission: &Submission) -> bool {
        self.form_handle
            .as_deref()
            .is_none_or(|handle| submission.form_handle == handle)
            && self
                .created_after
                .is_none_or(|after| submission.created_at >= after)
            && self
                .created_before
                .is_none_or(|before| submission.created_at < before)
    }
}
