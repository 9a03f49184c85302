//! 归因数据清理任务
//!
//! 清除超过保留期的提交中的归因快照，提交本身保留。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{error, info};

use crate::attribution::{cutoff_for, prune};
use crate::config::{AttributionConfig, PruneSchedule};
use crate::errors::{LeadInsightsError, Result};
use crate::storage::SubmissionStore;

/// 清理报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneReport {
    /// 被清除归因数据的提交数量
    pub pruned: u64,
    pub days: i64,
    pub cutoff: DateTime<Utc>,
}

impl PruneReport {
    pub fn summary(&self) -> String {
        format!(
            "Pruned attribution data from {} submission(s) older than {} days.",
            self.pruned, self.days
        )
    }
}

/// Strip attribution older than `days` days from every stored submission.
pub async fn run_prune(
    store: &dyn SubmissionStore,
    key: &str,
    days: i64,
    now: DateTime<Utc>,
) -> Result<PruneReport> {
    if days < 1 {
        return Err(LeadInsightsError::validation(format!(
            "Retention days must be at least 1, got {}",
            days
        )));
    }

    let cutoff = cutoff_for(days, now);
    let pruned = prune(store, cutoff, key).await?;

    Ok(PruneReport {
        pruned,
        days,
        cutoff,
    })
}

/// Next scheduled run strictly after `now`.
///
/// Weekly runs on Sunday, monthly on the 1st. Times are UTC.
pub fn next_run_after(schedule: PruneSchedule, at: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let at_day = |day: NaiveDate| day.and_time(at).and_utc();

    match schedule {
        PruneSchedule::Daily => {
            let candidate = at_day(today);
            if candidate > now {
                candidate
            } else {
                at_day(today + Duration::days(1))
            }
        }
        PruneSchedule::Weekly => {
            let until_sunday = (7 - today.weekday().num_days_from_sunday()) % 7;
            let candidate = at_day(today + Duration::days(until_sunday as i64));
            if candidate > now {
                candidate
            } else {
                candidate + Duration::days(7)
            }
        }
        PruneSchedule::Monthly => {
            let this_month = first_of_month(today.year(), today.month());
            let candidate = at_day(this_month);
            if candidate > now {
                candidate
            } else {
                let (year, month) = if today.month() == 12 {
                    (today.year() + 1, 1)
                } else {
                    (today.year(), today.month() + 1)
                };
                at_day(first_of_month(year, month))
            }
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// 定时清理任务
pub struct PruneTask {
    store: Arc<dyn SubmissionStore>,
    config: Arc<AttributionConfig>,
}

impl PruneTask {
    pub fn new(store: Arc<dyn SubmissionStore>, config: Arc<AttributionConfig>) -> Self {
        Self { store, config }
    }

    /// 使用配置的保留天数运行一次清理
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<PruneReport> {
        run_prune(
            self.store.as_ref(),
            &self.config.attribution_key,
            self.config.retention_days,
            now,
        )
        .await
    }

    /// 启动后台清理任务
    ///
    /// 按 prune_schedule / prune_schedule_time 计算下次运行时间，失败只记录日志
    pub fn spawn_background_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let schedule = self.config.prune_schedule;
        let at = self.config.schedule_time();

        info!(
            "Attribution prune task started (schedule: {} at {} UTC, retention: {} days)",
            schedule.as_ref(),
            at.format("%H:%M"),
            self.config.retention_days
        );

        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = next_run_after(schedule, at, now);
                let wait = (next - now).to_std().unwrap_or(StdDuration::ZERO);
                tokio::time::sleep(wait).await;

                match self.run_once(Utc::now()).await {
                    Ok(report) => info!("{}", report.summary()),
                    Err(e) => error!("Attribution prune task failed: {}", e),
                }
            }
        })
    }
}
