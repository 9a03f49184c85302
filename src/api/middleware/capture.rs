//! Attribution capture middleware
//!
//! Runs the visit hook on every site request and writes the resulting
//! record back to the visitor's attribution cookie. Requests under the
//! skipped prefixes (admin API, form endpoints) pass straight through.

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use chrono::Utc;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{trace, warn};

use crate::attribution::Signals;
use crate::services::{
    AttributionService, CaptureOutcome, RequestAttributionCapturer, VisitRequest,
};

/// Attribution capture middleware factory
#[derive(Clone)]
pub struct AttributionCapture {
    service: Arc<AttributionService>,
    skip_prefixes: Rc<Vec<String>>,
}

impl AttributionCapture {
    pub fn new(service: Arc<AttributionService>) -> Self {
        Self {
            service,
            skip_prefixes: Rc::new(Vec::new()),
        }
    }

    /// Leave requests under `prefix` alone
    pub fn skip_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() && prefix != "/" {
            Rc::make_mut(&mut self.skip_prefixes).push(prefix);
        }
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AttributionCapture
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AttributionCaptureMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AttributionCaptureMiddleware {
            service: Rc::new(service),
            attribution: self.service.clone(),
            skip_prefixes: self.skip_prefixes.clone(),
        }))
    }
}

pub struct AttributionCaptureMiddleware<S> {
    service: Rc<S>,
    attribution: Arc<AttributionService>,
    skip_prefixes: Rc<Vec<String>>,
}

impl<S> AttributionCaptureMiddleware<S> {
    fn is_skipped(&self, path: &str) -> bool {
        self.skip_prefixes.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn visit_request(&self, req: &ServiceRequest) -> VisitRequest {
        let landing_url = req.request().full_url().to_string();
        let referrer = req
            .headers()
            .get("Referer")
            .and_then(|h| h.to_str().ok());

        VisitRequest {
            signals: Signals::from_request(req.query_string(), Some(&landing_url), referrer),
            attribution_cookie: req
                .cookie(self.attribution.cookie_name())
                .map(|c| c.value().to_string()),
            consent_cookie: self
                .attribution
                .consent_cookie_name()
                .and_then(|name| req.cookie(name))
                .map(|c| c.value().to_string()),
        }
    }
}

impl<S, B> Service<ServiceRequest> for AttributionCaptureMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        if !self.attribution.is_enabled() || self.is_skipped(req.path()) {
            return Box::pin(async move { srv.call(req).await });
        }

        let visit = self.visit_request(&req);
        let secure = req.connection_info().scheme() == "https";
        let outcome = self.attribution.capture(&visit, Utc::now());
        let cookie = match outcome {
            CaptureOutcome::Persist(record) => {
                Some(self.attribution.build_cookie(&record, secure))
            }
            CaptureOutcome::Skip => None,
        };

        Box::pin(async move {
            let mut res = srv.call(req).await?;

            if let Some(cookie) = cookie {
                trace!("Writing attribution cookie '{}'", cookie.name());
                if let Err(e) = res.response_mut().add_cookie(&cookie) {
                    warn!("Failed to set attribution cookie: {}", e);
                }
            }

            Ok(res)
        })
    }
}
