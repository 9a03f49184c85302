//! Attribution retention
//!
//! Old submissions lose their attribution snapshot; the submission itself is
//! kept.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::Result;
use crate::storage::{Submission, SubmissionFilter, SubmissionStore};

/// Start of the UTC day `days` days before `now`.
///
/// Saturates at the representable range instead of overflowing.
pub fn cutoff_for(days: i64, now: DateTime<Utc>) -> DateTime<Utc> {
    let shifted = Duration::try_days(days)
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(if days < 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        });
    shifted.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Remove the attribution field from `submission` when it is older than
/// `cutoff` and carries a non-null value. Returns whether it changed.
pub fn strip_expired(submission: &mut Submission, cutoff: DateTime<Utc>, key: &str) -> bool {
    if submission.created_at >= cutoff {
        return false;
    }

    match submission.get(key) {
        None | Some(Value::Null) => false,
        Some(_) => {
            submission.remove(key);
            true
        }
    }
}

/// Strip attribution from every stored submission created before `cutoff`.
///
/// Returns the number of submissions modified. Running it twice with the
/// same cutoff modifies nothing the second time.
pub async fn prune(store: &dyn SubmissionStore, cutoff: DateTime<Utc>, key: &str) -> Result<u64> {
    let candidates = store
        .list(SubmissionFilter {
            created_before: Some(cutoff),
            ..Default::default()
        })
        .await?;

    let mut pruned = 0u64;
    for mut submission in candidates {
        if !strip_expired(&mut submission, cutoff, key) {
            continue;
        }
        store.save(&submission).await?;
        debug!("Stripped attribution from submission {}", submission.id);
        pruned += 1;
    }

    info!(
        "Pruned attribution from {} submission(s) created before {}",
        pruned,
        cutoff.to_rfc3339()
    );
    Ok(pruned)
}
