//! Attribution engine
//!
//! Pure rules for capturing, merging, reporting and pruning marketing
//! attribution. Nothing in here touches HTTP; the host passes request data
//! and configuration in explicitly.

pub mod aggregation;
pub mod consent;
pub mod merger;
pub mod record;
pub mod retention;

pub use aggregation::{
    AggregationRow, NONE_LABEL, ReportEntry, aggregate_by_field, aggregate_by_form, share_percent,
};
pub use consent::{ConsentPolicy, decide};
pub use merger::{AnonymousCapture, Signals, for_submission, update};
pub use record::{ATTRIBUTION_VERSION, AttributionRecord, UtmField, UtmValues};
pub use retention::{cutoff_for, prune, strip_expired};
