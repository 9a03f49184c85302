//! Attribution merge rules
//!
//! Two entry points:
//! - [`update`] runs on every site visit and produces the new cookie state
//! - [`for_submission`] picks the snapshot attached to a form submission

use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;
use tracing::debug;

use super::record::{ATTRIBUTION_VERSION, AttributionRecord, UtmField, UtmValues, normalize};
use crate::config::AttributionConfig;

/// Signals observed on the current request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub referrer: Option<String>,
    pub landing_url: Option<String>,
}

impl Signals {
    /// Collect signals from the raw query string, the `Referer` header and
    /// the full request URL.
    pub fn from_request(query: &str, landing_url: Option<&str>, referrer: Option<&str>) -> Self {
        let mut signals = Self {
            referrer: normalize(referrer),
            landing_url: normalize(landing_url),
            ..Default::default()
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let Some(field) = UtmField::iter().find(|f| {
                let name: &str = f.as_ref();
                name == key
            }) else {
                continue;
            };
            let value = normalize(Some(value.as_ref()));
            match field {
                UtmField::Source => signals.utm_source = value,
                UtmField::Medium => signals.utm_medium = value,
                UtmField::Campaign => signals.utm_campaign = value,
                UtmField::Term => signals.utm_term = value,
                UtmField::Content => signals.utm_content = value,
            }
        }

        signals
    }
}

impl UtmValues for Signals {
    fn utm(&self, field: UtmField) -> Option<&str> {
        match field {
            UtmField::Source => self.utm_source.as_deref(),
            UtmField::Medium => self.utm_medium.as_deref(),
            UtmField::Campaign => self.utm_campaign.as_deref(),
            UtmField::Term => self.utm_term.as_deref(),
            UtmField::Content => self.utm_content.as_deref(),
        }
    }
}

/// Compute the attribution state to persist after a visit.
///
/// Returns `None` when tracking is not allowed; the caller must then leave
/// the cookie untouched.
pub fn update(
    existing: Option<&AttributionRecord>,
    incoming: &Signals,
    now: DateTime<Utc>,
    consent_allowed: bool,
) -> Option<AttributionRecord> {
    if !consent_allowed {
        return None;
    }

    let Some(existing) = existing else {
        return Some(AttributionRecord {
            utm_source: incoming.utm_source.clone(),
            utm_medium: incoming.utm_medium.clone(),
            utm_campaign: incoming.utm_campaign.clone(),
            utm_term: incoming.utm_term.clone(),
            utm_content: incoming.utm_content.clone(),
            referrer: incoming.referrer.clone(),
            landing_url: incoming.landing_url.clone(),
            first_seen_at: Some(now),
            last_seen_at: Some(now),
            version: ATTRIBUTION_VERSION,
        });
    };

    if !incoming.has_utm() {
        // 无 UTM 的访问只刷新时间
        return Some(AttributionRecord {
            last_seen_at: Some(now),
            version: ATTRIBUTION_VERSION,
            ..existing.clone()
        });
    }

    let pick = |new: &Option<String>, old: &Option<String>| new.clone().or_else(|| old.clone());

    Some(AttributionRecord {
        utm_source: pick(&incoming.utm_source, &existing.utm_source),
        utm_medium: pick(&incoming.utm_medium, &existing.utm_medium),
        utm_campaign: pick(&incoming.utm_campaign, &existing.utm_campaign),
        utm_term: pick(&incoming.utm_term, &existing.utm_term),
        utm_content: pick(&incoming.utm_content, &existing.utm_content),
        referrer: pick(&incoming.referrer, &existing.referrer),
        landing_url: pick(&incoming.landing_url, &existing.landing_url),
        first_seen_at: existing.first_seen_at.or(Some(now)),
        last_seen_at: Some(now),
        version: ATTRIBUTION_VERSION,
    })
}

/// What may be recorded for a visitor without a consented cookie
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnonymousCapture {
    pub landing: bool,
    pub referrer: bool,
}

impl AnonymousCapture {
    pub fn from_config(config: &AttributionConfig) -> Self {
        Self {
            landing: config.store_landing_without_consent,
            referrer: config.store_referrer_without_consent,
        }
    }
}

/// Choose the attribution snapshot for a new submission.
///
/// A cookie record is trusted as proof of earlier consent and returned as is.
/// Without one, a minimal landing/referrer record is built if `anonymous`
/// allows it.
pub fn for_submission(
    cookie_record: Option<AttributionRecord>,
    consent_allowed: bool,
    anonymous: AnonymousCapture,
    request_url: &str,
    referrer: Option<&str>,
    now: DateTime<Utc>,
) -> Option<AttributionRecord> {
    if let Some(record) = cookie_record {
        if !consent_allowed {
            debug!("Attribution cookie present but consent is no longer granted, keeping cookie data");
        }
        return Some(record);
    }

    let referrer = if anonymous.referrer {
        normalize(referrer)
    } else {
        None
    };

    if anonymous.landing {
        return Some(AttributionRecord {
            landing_url: normalize(Some(request_url)),
            referrer,
            last_seen_at: Some(now),
            ..Default::default()
        });
    }

    referrer.map(|referrer| AttributionRecord {
        referrer: Some(referrer),
        last_seen_at: Some(now),
        ..Default::default()
    })
}
