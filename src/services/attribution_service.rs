//! Attribution service layer
//!
//! Binds the attribution rules to configuration. The HTTP layer extracts
//! cookies and headers into [`VisitRequest`] / [`SubmissionRequest`] and
//! calls through the [`RequestAttributionCapturer`] and
//! [`SubmissionEnricher`] traits.

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::attribution::{
    AnonymousCapture, AttributionRecord, ConsentPolicy, Signals, for_submission, update,
};
use crate::config::AttributionConfig;
use crate::storage::Submission;

/// Request data needed to update the visitor's attribution cookie
#[derive(Debug, Clone, Default)]
pub struct VisitRequest {
    pub signals: Signals,
    /// 当前归因 cookie 的原始值
    pub attribution_cookie: Option<String>,
    /// 同意 cookie 的值，cookie 不存在时为 None
    pub consent_cookie: Option<String>,
}

/// Request data needed to attach attribution to a submission
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    pub request_url: String,
    pub referrer: Option<String>,
    pub attribution_cookie: Option<String>,
    pub consent_cookie: Option<String>,
}

/// Result of processing a visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Write this record back to the visitor cookie
    Persist(AttributionRecord),
    /// Leave the cookie untouched
    Skip,
}

/// Visit hook, run on every site request
pub trait RequestAttributionCapturer: Send + Sync {
    fn capture(&self, request: &VisitRequest, now: DateTime<Utc>) -> CaptureOutcome;
}

/// Submission hook, run before a new submission is stored
pub trait SubmissionEnricher: Send + Sync {
    fn enrich(&self, submission: &mut Submission, request: &SubmissionRequest, now: DateTime<Utc>);
}

/// Attribution 服务
pub struct AttributionService {
    config: Arc<AttributionConfig>,
    consent: ConsentPolicy,
    anonymous: AnonymousCapture,
}

impl AttributionService {
    pub fn new(config: Arc<AttributionConfig>) -> Self {
        let consent = ConsentPolicy::from_config(&config);
        let anonymous = AnonymousCapture::from_config(&config);
        Self {
            config,
            consent,
            anonymous,
        }
    }

    pub fn config(&self) -> &AttributionConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// 需要从请求中读取的同意 cookie 名称
    pub fn consent_cookie_name(&self) -> Option<&str> {
        self.config.consent_cookie_name.as_deref()
    }

    fn consent_allowed(&self, consent_cookie: Option<&String>) -> bool {
        self.consent.allows(|_| consent_cookie.cloned())
    }

    /// Build the `Set-Cookie` for a persisted record.
    pub fn build_cookie(&self, record: &AttributionRecord, secure: bool) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.config.cookie_name.clone(), record.to_cookie_value());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(CookieDuration::days(self.config.cookie_ttl_days.max(0)));
        cookie
    }
}

impl RequestAttributionCapturer for AttributionService {
    fn capture(&self, request: &VisitRequest, now: DateTime<Utc>) -> CaptureOutcome {
        if !self.config.enabled {
            return CaptureOutcome::Skip;
        }

        let existing = request
            .attribution_cookie
            .as_deref()
            .and_then(AttributionRecord::from_cookie_value);
        let allowed = self.consent_allowed(request.consent_cookie.as_ref());

        match update(existing.as_ref(), &request.signals, now, allowed) {
            Some(record) => {
                trace!(
                    "Attribution captured: source={:?}, campaign={:?}",
                    record.utm_source, record.utm_campaign
                );
                CaptureOutcome::Persist(record)
            }
            None => {
                trace!("Attribution capture skipped, consent not granted");
                CaptureOutcome::Skip
            }
        }
    }
}

impl SubmissionEnricher for AttributionService {
    fn enrich(&self, submission: &mut Submission, request: &SubmissionRequest, now: DateTime<Utc>) {
        if !self.config.enabled {
            return;
        }

        let cookie_record = request
            .attribution_cookie
            .as_deref()
            .and_then(AttributionRecord::from_cookie_value);
        let allowed = self.consent_allowed(request.consent_cookie.as_ref());

        let Some(record) = for_submission(
            cookie_record,
            allowed,
            self.anonymous,
            &request.request_url,
            request.referrer.as_deref(),
            now,
        ) else {
            debug!(
                "No attribution attached to submission {} (form '{}')",
                submission.id, submission.form_handle
            );
            return;
        };

        submission.set(self.config.attribution_key.clone(), record.to_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::UtmValues;
    use chrono::TimeZone;
    use serde_json::Map;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
    }

    fn service(configure: impl FnOnce(&mut AttributionConfig)) -> AttributionService {
        let mut config = AttributionConfig::default();
        configure(&mut config);
        AttributionService::new(Arc::new(config))
    }

    fn visit(query: &str) -> VisitRequest {
        VisitRequest {
            signals: Signals::from_request(query, Some("https://example.com/"), None),
            ..Default::default()
        }
    }

    #[test]
    fn test_capture_requires_consent_by_default() {
        let svc = service(|_| {});
        assert_eq!(svc.capture(&visit("utm_source=google"), now()), CaptureOutcome::Skip);
    }

    #[test]
    fn test_capture_with_consent_cookie() {
        let svc = service(|c| {
            c.consent_cookie_name = Some("cookie_consent".into());
            c.consent_cookie_value = Some("yes".into());
        });

        let mut request = visit("utm_source=google");
        request.consent_cookie = Some("no".into());
        assert_eq!(svc.capture(&request, now()), CaptureOutcome::Skip);

        request.consent_cookie = Some("yes".into());
        match svc.capture(&request, now()) {
            CaptureOutcome::Persist(record) => {
                assert_eq!(record.utm_source.as_deref(), Some("google"));
                assert_eq!(record.first_seen_at, Some(now()));
            }
            CaptureOutcome::Skip => panic!("expected a record"),
        }
    }

    #[test]
    fn test_capture_merges_existing_cookie() {
        let svc = service(|c| c.consent_required = false);
        let first = match svc.capture(&visit("utm_source=google&utm_medium=cpc"), now()) {
            CaptureOutcome::Persist(record) => record,
            CaptureOutcome::Skip => panic!("expected a record"),
        };

        let mut request = visit("utm_source=newsletter");
        request.attribution_cookie = Some(first.to_cookie_value());
        let later = now() + chrono::Duration::days(1);
        match svc.capture(&request, later) {
            CaptureOutcome::Persist(record) => {
                assert_eq!(record.utm_source.as_deref(), Some("newsletter"));
                assert_eq!(record.utm_medium.as_deref(), Some("cpc"));
                assert_eq!(record.first_seen_at, Some(now()));
                assert_eq!(record.last_seen_at, Some(later));
            }
            CaptureOutcome::Skip => panic!("expected a record"),
        }
    }

    #[test]
    fn test_garbage_cookie_starts_fresh() {
        let svc = service(|c| c.consent_required = false);
        let mut request = visit("utm_campaign=launch");
        request.attribution_cookie = Some("%%%not-json".into());
        match svc.capture(&request, now()) {
            CaptureOutcome::Persist(record) => {
                assert_eq!(record.utm_campaign.as_deref(), Some("launch"));
                assert_eq!(record.first_seen_at, Some(now()));
            }
            CaptureOutcome::Skip => panic!("expected a record"),
        }
    }

    #[test]
    fn test_disabled_does_nothing() {
        let svc = service(|c| {
            c.enabled = false;
            c.consent_required = false;
        });
        assert_eq!(svc.capture(&visit("utm_source=google"), now()), CaptureOutcome::Skip);

        let mut sub = Submission::new("contact", Map::new(), now());
        svc.enrich(
            &mut sub,
            &SubmissionRequest {
                request_url: "https://example.com/contact".into(),
                ..Default::default()
            },
            now(),
        );
        assert!(sub.data.is_empty());
    }

    #[test]
    fn test_enrich_from_cookie() {
        let svc = service(|_| {});
        let record = AttributionRecord {
            utm_source: Some("google".into()),
            first_seen_at: Some(now()),
            last_seen_at: Some(now()),
            ..Default::default()
        };

        let mut sub = Submission::new("contact", Map::new(), now());
        svc.enrich(
            &mut sub,
            &SubmissionRequest {
                request_url: "https://example.com/contact".into(),
                attribution_cookie: Some(record.to_cookie_value()),
                ..Default::default()
            },
            now(),
        );
        assert_eq!(sub.attribution("__attribution"), Some(record));
    }

    #[test]
    fn test_enrich_landing_only_without_cookie() {
        let svc = service(|c| c.attribution_key = "_source".into());
        let mut sub = Submission::new("contact", Map::new(), now());
        svc.enrich(
            &mut sub,
            &SubmissionRequest {
                request_url: "https://example.com/contact".into(),
                referrer: Some("https://ref.example/".into()),
                ..Default::default()
            },
            now(),
        );

        let record = sub.attribution("_source").unwrap();
        assert_eq!(record.landing_url.as_deref(), Some("https://example.com/contact"));
        assert!(record.referrer.is_none());
        assert!(!record.has_utm());
    }

    #[test]
    fn test_enrich_nothing_when_landing_disabled() {
        let svc = service(|c| c.store_landing_without_consent = false);
        let mut sub = Submission::new("contact", Map::new(), now());
        svc.enrich(
            &mut sub,
            &SubmissionRequest {
                request_url: "https://example.com/contact".into(),
                ..Default::default()
            },
            now(),
        );
        assert!(sub.get("__attribution").is_none());
    }

    #[test]
    fn test_build_cookie() {
        let svc = service(|c| c.cookie_ttl_days = 7);
        let record = AttributionRecord {
            utm_source: Some("google".into()),
            ..Default::default()
        };
        let cookie = svc.build_cookie(&record, true);

        assert_eq!(cookie.name(), "lead_insights_attribution");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));
        assert_eq!(AttributionRecord::from_cookie_value(cookie.value()), Some(record));
    }
}
