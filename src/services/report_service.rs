//! Report service layer
//!
//! Lead reports shared between the admin HTTP API and the CLI.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

use crate::attribution::{
    AggregationRow, ReportEntry, UtmField, aggregate_by_field, aggregate_by_form, cutoff_for,
};
use crate::config::AttributionConfig;
use crate::errors::{LeadInsightsError, Result};
use crate::storage::{Submission, SubmissionFilter, SubmissionStore};

/// 报表类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportType {
    /// Leads by `utm_source`
    Source,
    /// Leads by `utm_campaign`
    Campaign,
    /// Leads by form
    Form,
    /// Leads by `utm_source` for one form
    FormSource,
}

impl ReportType {
    /// 解析报表类型，未知类型返回 Validation 错误
    pub fn parse(raw: &str) -> Result<Self> {
        Self::from_str(raw.trim()).map_err(|_| {
            let valid: Vec<String> = Self::iter().map(|t| t.as_ref().to_string()).collect();
            LeadInsightsError::validation(format!(
                "Invalid report type: '{}'. Valid: {}",
                raw,
                valid.join(", ")
            ))
        })
    }
}

/// Report request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub report_type: ReportType,
    pub days: Option<i64>,
    pub form: Option<String>,
}

/// Ranked rows plus the number of submissions in range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub rows: Vec<AggregationRow>,
    pub total: u64,
}

/// Report 服务
pub struct ReportService {
    store: Arc<dyn SubmissionStore>,
    config: Arc<AttributionConfig>,
}

impl ReportService {
    pub fn new(store: Arc<dyn SubmissionStore>, config: Arc<AttributionConfig>) -> Self {
        Self { store, config }
    }

    /// Effective day count for a query, validated.
    pub fn resolve_days(&self, days: Option<i64>) -> Result<i64> {
        let days = days.unwrap_or(self.config.default_date_range_days);
        if days < 1 {
            return Err(LeadInsightsError::validation(format!(
                "days must be at least 1, got {}",
                days
            )));
        }
        Ok(days)
    }

    /// 校验查询参数，返回 (days, form)
    pub fn validate<'a>(&self, query: &'a ReportQuery) -> Result<(i64, Option<&'a str>)> {
        let days = self.resolve_days(query.days)?;
        let form = query
            .form
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());

        match (query.report_type, form) {
            (ReportType::FormSource, None) => Err(LeadInsightsError::validation(
                "form is required for the form_source report",
            )),
            (ReportType::FormSource, Some(form)) => Ok((days, Some(form))),
            // 其他报表忽略 form
            (_, _) => Ok((days, None)),
        }
    }

    /// Submissions created since the start of the day `days` days ago.
    pub async fn submissions_for_range(
        &self,
        days: i64,
        form: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Submission>> {
        let filter = SubmissionFilter {
            form_handle: form.map(str::to_string),
            created_after: Some(cutoff_for(days, now)),
            created_before: None,
        };
        self.store.list(filter).await
    }

    pub async fn run(&self, query: &ReportQuery, now: DateTime<Utc>) -> Result<Report> {
        let (days, form) = self.validate(query)?;
        let submissions = self.submissions_for_range(days, form, now).await?;

        let key = self.config.attribution_key.as_str();
        let entries: Vec<ReportEntry> = submissions.iter().map(|s| s.report_entry(key)).collect();
        let top_n = self.config.top_n;

        let rows = match query.report_type {
            ReportType::Source | ReportType::FormSource => {
                aggregate_by_field(&entries, UtmField::Source, top_n)
            }
            ReportType::Campaign => aggregate_by_field(&entries, UtmField::Campaign, top_n),
            ReportType::Form => aggregate_by_form(&entries, top_n),
        };

        debug!(
            "Report {} over {} day(s): {} row(s) from {} submission(s)",
            query.report_type.as_ref(),
            days,
            rows.len(),
            entries.len()
        );

        Ok(Report {
            rows,
            total: entries.len() as u64,
        })
    }

    /// Download name for an exported report
    pub fn export_filename(report_type: ReportType, days: i64) -> String {
        format!("lead-insights-{}-{}d.csv", report_type.as_ref(), days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::{Duration, TimeZone};
    use serde_json::{Map, json};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
    }

    async fn seeded() -> ReportService {
        let store = Arc::new(MemoryStorage::new());
        let rows = [
            ("contact", 1, Some(json!({ "utm_source": "google", "utm_campaign": "spring" }))),
            ("contact", 2, Some(json!({ "utm_source": "google" }))),
            ("contact", 3, Some(json!({ "utm_source": "facebook", "utm_campaign": "spring" }))),
            ("newsletter", 4, Some(json!({ "utm_source": "google" }))),
            ("newsletter", 5, None),
            ("contact", 45, Some(json!({ "utm_source": "bing" }))),
        ];
        for (form, age, attribution) in rows {
            let mut sub = Submission::new(form, Map::new(), now() - Duration::days(age));
            if let Some(value) = attribution {
                sub.set("__attribution", value);
            }
            store.insert(&sub).await.unwrap();
        }
        ReportService::new(store, Arc::new(AttributionConfig::default()))
    }

    fn query(report_type: ReportType, days: Option<i64>, form: Option<&str>) -> ReportQuery {
        ReportQuery {
            report_type,
            days,
            form: form.map(str::to_string),
        }
    }

    fn row(label: &str, count: u64) -> AggregationRow {
        AggregationRow {
            label: label.to_string(),
            count,
        }
    }

    #[test]
    fn test_report_type_parse() {
        assert_eq!(ReportType::parse("source").unwrap(), ReportType::Source);
        assert_eq!(ReportType::parse("form_source").unwrap(), ReportType::FormSource);
        let err = ReportType::parse("medium").unwrap_err();
        assert!(matches!(err, LeadInsightsError::Validation(_)));
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            ReportService::export_filename(ReportType::FormSource, 30),
            "lead-insights-form_source-30d.csv"
        );
    }

    #[tokio::test]
    async fn test_source_report_uses_default_range() {
        let svc = seeded().await;
        let report = svc
            .run(&query(ReportType::Source, None, None), now())
            .await
            .unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.rows, vec![row("google", 3), row("facebook", 1)]);
    }

    #[tokio::test]
    async fn test_campaign_report() {
        let svc = seeded().await;
        let report = svc
            .run(&query(ReportType::Campaign, Some(60), None), now())
            .await
            .unwrap();
        assert_eq!(report.total, 6);
        assert_eq!(report.rows, vec![row("(none)", 3), row("spring", 2)]);
    }

    #[tokio::test]
    async fn test_form_report_counts_all_submissions() {
        let svc = seeded().await;
        let report = svc
            .run(&query(ReportType::Form, Some(7), None), now())
            .await
            .unwrap();
        assert_eq!(report.rows, vec![row("contact", 3), row("newsletter", 2)]);
    }

    #[tokio::test]
    async fn test_form_source_report() {
        let svc = seeded().await;
        let report = svc
            .run(&query(ReportType::FormSource, Some(7), Some("newsletter")), now())
            .await
            .unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.rows, vec![row("google", 1)]);

        let unknown = svc
            .run(&query(ReportType::FormSource, Some(7), Some("missing")), now())
            .await
            .unwrap();
        assert_eq!(unknown.total, 0);
        assert!(unknown.rows.is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let svc = seeded().await;
        for bad in [
            query(ReportType::Source, Some(0), None),
            query(ReportType::FormSource, Some(7), None),
            query(ReportType::FormSource, Some(7), Some("  ")),
        ] {
            let err = svc.run(&bad, now()).await.unwrap_err();
            assert!(matches!(err, LeadInsightsError::Validation(_)), "{:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_form_ignored_outside_form_source() {
        let svc = seeded().await;
        let with_form = svc
            .run(&query(ReportType::Source, None, Some("newsletter")), now())
            .await
            .unwrap();
        let without = svc
            .run(&query(ReportType::Source, None, None), now())
            .await
            .unwrap();
        assert_eq!(with_form, without);
        assert_eq!(with_form.total, 5);
    }

    #[tokio::test]
    async fn test_huge_day_range_covers_everything() {
        let svc = seeded().await;
        for days in [1_000_000_000, i64::MAX] {
            let report = svc
                .run(&query(ReportType::Source, Some(days), None), now())
                .await
                .unwrap();
            assert_eq!(report.total, 6);
            // 同票按首次出现（最早提交）排序
            assert_eq!(
                report.rows,
                vec![row("google", 3), row("bing", 1), row("facebook", 1)]
            );
        }
    }

    #[tokio::test]
    async fn test_range_starts_at_day_boundary() {
        let store = Arc::new(MemoryStorage::new());
        let midnight = Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap();
        store
            .insert(&Submission::new("contact", Map::new(), midnight))
            .await
            .unwrap();
        store
            .insert(&Submission::new(
                "contact",
                Map::new(),
                midnight - Duration::seconds(1),
            ))
            .await
            .unwrap();
        let svc = ReportService::new(store, Arc::new(AttributionConfig::default()));

        let subs = svc.submissions_for_range(7, None, now()).await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].created_at, midnight);
    }
}
