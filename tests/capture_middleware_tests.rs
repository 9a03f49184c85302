//! Attribution capture middleware integration tests
//!
//! Drives a minimal app through the capture middleware and checks the
//! `Set-Cookie` it produces.

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpResponse, web};
use chrono::{Duration, Utc};

use lead_insights::api::middleware::AttributionCapture;
use lead_insights::attribution::AttributionRecord;
use lead_insights::config::AttributionConfig;
use lead_insights::services::AttributionService;

const COOKIE: &str = "lead_insights_attribution";

fn consent_config() -> AttributionConfig {
    AttributionConfig {
        consent_cookie_name: Some("cookie_consent".to_string()),
        consent_cookie_value: Some("yes".to_string()),
        ..Default::default()
    }
}

fn attribution_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE)
        .map(|c| c.into_owned())
}

macro_rules! capture_app {
    ($config:expr) => {{
        let service = Arc::new(AttributionService::new(Arc::new($config)));
        test::init_service(
            App::new()
                .wrap(AttributionCapture::new(service).skip_prefix("/admin"))
                .default_service(web::to(|| async { HttpResponse::Ok().body("page") })),
        )
        .await
    }};
}

#[actix_rt::test]
async fn test_sets_cookie_with_consent() {
    let app = capture_app!(consent_config());

    let req = TestRequest::get()
        .uri("/pricing?utm_source=google&utm_medium=cpc&utm_campaign=spring")
        .insert_header(("Referer", "https://news.example/story"))
        .cookie(Cookie::new("cookie_consent", "yes"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let cookie = attribution_cookie(&resp).expect("attribution cookie should be set");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_ne!(cookie.secure(), Some(true));

    let record = AttributionRecord::from_cookie_value(cookie.value()).unwrap();
    assert_eq!(record.utm_source.as_deref(), Some("google"));
    assert_eq!(record.utm_medium.as_deref(), Some("cpc"));
    assert_eq!(record.utm_campaign.as_deref(), Some("spring"));
    assert_eq!(record.referrer.as_deref(), Some("https://news.example/story"));
    assert!(record.landing_url.unwrap().contains("/pricing?utm_source=google"));
    assert_eq!(record.first_seen_at, record.last_seen_at);
}

#[actix_rt::test]
async fn test_no_cookie_without_consent() {
    let app = capture_app!(consent_config());

    let req = TestRequest::get()
        .uri("/pricing?utm_source=google")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(attribution_cookie(&resp).is_none());

    let req = TestRequest::get()
        .uri("/pricing?utm_source=google")
        .cookie(Cookie::new("cookie_consent", "no"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(attribution_cookie(&resp).is_none());
}

#[actix_rt::test]
async fn test_no_cookie_when_consent_cookie_not_configured() {
    let app = capture_app!(AttributionConfig::default());

    let req = TestRequest::get()
        .uri("/?utm_source=google")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(attribution_cookie(&resp).is_none());
}

#[actix_rt::test]
async fn test_skipped_prefix_is_untouched() {
    let app = capture_app!(AttributionConfig {
        consent_required: false,
        ..Default::default()
    });

    let req = TestRequest::get()
        .uri("/admin/reports?utm_source=google")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(attribution_cookie(&resp).is_none());

    // 前缀匹配按路径段进行
    let req = TestRequest::get()
        .uri("/administration?utm_source=google")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(attribution_cookie(&resp).is_some());
}

#[actix_rt::test]
async fn test_disabled_sets_nothing() {
    let app = capture_app!(AttributionConfig {
        enabled: false,
        consent_required: false,
        ..Default::default()
    });

    let req = TestRequest::get()
        .uri("/?utm_source=google")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(attribution_cookie(&resp).is_none());
}

#[actix_rt::test]
async fn test_existing_cookie_keeps_first_touch() {
    let app = capture_app!(AttributionConfig {
        consent_required: false,
        ..Default::default()
    });

    let first_seen = Utc::now() - Duration::days(3);
    let existing = AttributionRecord {
        utm_source: Some("google".to_string()),
        utm_medium: Some("cpc".to_string()),
        landing_url: Some("https://example.com/first".to_string()),
        first_seen_at: Some(first_seen),
        last_seen_at: Some(first_seen),
        ..Default::default()
    };

    // 无 UTM 的访问只刷新 last_seen_at
    let req = TestRequest::get()
        .uri("/blog")
        .cookie(Cookie::new(COOKIE, existing.to_cookie_value()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let record =
        AttributionRecord::from_cookie_value(attribution_cookie(&resp).unwrap().value()).unwrap();
    assert_eq!(record.utm_source.as_deref(), Some("google"));
    assert_eq!(record.landing_url.as_deref(), Some("https://example.com/first"));
    assert_eq!(record.first_seen_at, Some(first_seen));
    assert!(record.last_seen_at.unwrap() > first_seen);

    // 新的 UTM 覆盖对应字段，保留其余字段
    let req = TestRequest::get()
        .uri("/?utm_source=newsletter")
        .cookie(Cookie::new(COOKIE, existing.to_cookie_value()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let record =
        AttributionRecord::from_cookie_value(attribution_cookie(&resp).unwrap().value()).unwrap();
    assert_eq!(record.utm_source.as_deref(), Some("newsletter"));
    assert_eq!(record.utm_medium.as_deref(), Some("cpc"));
    assert_eq!(record.first_seen_at, Some(first_seen));
}
