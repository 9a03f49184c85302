//! In-memory submission store
//!
//! Used with `database_url = "memory://"` and in tests. Nothing survives a
//! restart.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Submission, SubmissionFilter, SubmissionStore};
use crate::errors::{LeadInsightsError, Result};

#[derive(Default)]
pub struct MemoryStorage {
    submissions: RwLock<Vec<Submission>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.submissions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.read().is_empty()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStorage {
    async fn insert(&self, submission: &Submission) -> Result<()> {
        let mut submissions = self.submissions.write();
        if submissions.iter().any(|s| s.id == submission.id) {
            return Err(LeadInsightsError::database_operation(format!(
                "Submission already exists: {}",
                submission.id
            )));
        }
        submissions.push(submission.clone());
        Ok(())
    }

    async fn save(&self, submission: &Submission) -> Result<()> {
        let mut submissions = self.submissions.write();
        match submissions.iter_mut().find(|s| s.id == submission.id) {
            Some(existing) => {
                existing.data = submission.data.clone();
                Ok(())
            }
            None => Err(LeadInsightsError::not_found(format!(
                "Submission not found: {}",
                submission.id
            ))),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Submission>> {
        Ok(self.submissions.read().iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self, filter: SubmissionFilter) -> Result<Vec<Submission>> {
        let mut result: Vec<Submission> = self
            .submissions
            .read()
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        result.sort_by_key(|s| s.created_at);
        Ok(result)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
