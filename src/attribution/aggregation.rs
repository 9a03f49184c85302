//! Lead aggregation for reports
//!
//! Counts submissions by a UTM field or by form, most frequent first.

use std::collections::HashMap;

use serde::Serialize;

use super::record::{AttributionRecord, UtmField};

/// Label used for submissions without a value
pub const NONE_LABEL: &str = "(none)";

/// Minimal view of a submission used by the aggregation engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub form_handle: String,
    pub attribution: Option<AttributionRecord>,
}

/// One ranked report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationRow {
    pub label: String,
    pub count: u64,
}

/// Top `top_n` values of `field` among entries that carry attribution.
pub fn aggregate_by_field(entries: &[ReportEntry], field: UtmField, top_n: i64) -> Vec<AggregationRow> {
    let labels = entries.iter().filter_map(|entry| {
        entry
            .attribution
            .as_ref()
            .map(|record| field.value_of(record).unwrap_or_default())
    });
    rank(labels, top_n)
}

/// Top `top_n` forms by number of submissions. Attribution is not required.
pub fn aggregate_by_form(entries: &[ReportEntry], top_n: i64) -> Vec<AggregationRow> {
    rank(entries.iter().map(|entry| entry.form_handle.as_str()), top_n)
}

/// Share of `total` in percent, one decimal
pub fn share_percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

fn rank<'a, I>(labels: I, top_n: i64) -> Vec<AggregationRow>
where
    I: Iterator<Item = &'a str>,
{
    if top_n <= 0 {
        return Vec::new();
    }

    // 保持首次出现的顺序，排序稳定
    let mut rows: Vec<AggregationRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        let label = if label.is_empty() { NONE_LABEL } else { label };
        match index.get(label) {
            Some(&i) => rows[i].count += 1,
            None => {
                index.insert(label, rows.len());
                rows.push(AggregationRow {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(usize::try_from(top_n).unwrap_or(usize::MAX));
    rows
}
