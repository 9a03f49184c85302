//! Prune attribution command

use chrono::Utc;
use colored::Colorize;
use std::sync::Arc;

use crate::config::AttributionConfig;
use crate::interfaces::cli::CliError;
use crate::services::run_prune;
use crate::storage::SubmissionStore;

/// `--days` 覆盖配置中的保留天数
pub async fn prune_submissions(
    storage: Arc<dyn SubmissionStore>,
    config: &AttributionConfig,
    days: Option<i64>,
) -> Result<(), CliError> {
    let days = days.unwrap_or(config.retention_days);

    let report = run_prune(storage.as_ref(), &config.attribution_key, days, Utc::now()).await?;

    println!("{} {}", "✓".bold().green(), report.summary());
    println!(
        "  {}",
        format!("cutoff: {}", report.cutoff.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, Submission};
    use chrono::Duration;
    use serde_json::{Map, json};

    #[tokio::test]
    async fn test_prune_uses_override_and_rejects_zero() {
        let store = Arc::new(MemoryStorage::new());
        let mut data = Map::new();
        data.insert("__attribution".into(), json!({ "utm_source": "google" }));
        let old = Submission::new("contact", data, Utc::now() - Duration::days(60));
        store.insert(&old).await.unwrap();

        let config = AttributionConfig::default();
        prune_submissions(store.clone(), &config, Some(30))
            .await
            .unwrap();
        let stored = store.get(&old.id).await.unwrap().unwrap();
        assert!(stored.get("__attribution").is_none());

        let err = prune_submissions(store, &config, Some(0)).await.unwrap_err();
        assert!(matches!(err, CliError::ParseError(_)));
    }
}
