//! 表单提交端点
//!
//! `POST {forms_prefix}/{handle}/submissions` 接收 JSON 对象，
//! 在入库前附加访客的归因快照。

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, Responder, web};
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::services::{AttributionService, SubmissionEnricher, SubmissionRequest};
use crate::storage::{Submission, SubmissionStore};

use super::admin::{ErrorCode, SubmissionCreated, error_response, json_response};

pub struct FormsService;

impl FormsService {
    pub async fn post_submission(
        req: HttpRequest,
        path: web::Path<String>,
        body: web::Bytes,
        store: web::Data<Arc<dyn SubmissionStore>>,
        attribution: web::Data<Arc<AttributionService>>,
    ) -> impl Responder {
        let form_handle = path.into_inner();
        let form_handle = form_handle.trim();
        if form_handle.is_empty() {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::SubmissionInvalidBody,
                "Form handle is required",
            );
        }

        let data = match Self::parse_body(&body) {
            Some(data) => data,
            None => {
                debug!("Rejected submission for '{}': body is not a JSON object", form_handle);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::SubmissionInvalidBody,
                    "Request body must be a JSON object",
                );
            }
        };

        let now = Utc::now();
        let mut submission = Submission::new(form_handle, data, now);
        // 归因字段只能由服务端写入
        let attribution_key = attribution.config().attribution_key.as_str();
        if submission.remove(attribution_key).is_some() {
            debug!(
                "Dropped client-supplied '{}' from submission for '{}'",
                attribution_key, form_handle
            );
        }
        let request = Self::submission_request(&req, &attribution);
        attribution.enrich(&mut submission, &request, now);

        if let Err(e) = store.insert(&submission).await {
            error!("Failed to store submission for '{}': {}", form_handle, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::SubmissionStoreFailed,
                "Failed to store submission",
            );
        }

        info!("Stored submission {} for form '{}'", submission.id, form_handle);
        json_response(
            StatusCode::CREATED,
            ErrorCode::Success,
            "Created",
            Some(SubmissionCreated { id: submission.id }),
        )
    }

    fn parse_body(body: &[u8]) -> Option<Map<String, Value>> {
        match serde_json::from_slice::<Value>(body).ok()? {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// 从请求中提取归因所需的 cookie 和 header
    fn submission_request(req: &HttpRequest, attribution: &AttributionService) -> SubmissionRequest {
        let attribution_cookie = req
            .cookie(attribution.cookie_name())
            .map(|c| c.value().to_string());
        let consent_cookie = attribution
            .consent_cookie_name()
            .and_then(|name| req.cookie(name))
            .map(|c| c.value().to_string());
        let referrer = req
            .headers()
            .get("Referer")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        SubmissionRequest {
            request_url: req.full_url().to_string(),
            referrer,
            attribution_cookie,
            consent_cookie,
        }
    }
}

/// 表单路由，挂载在 forms 前缀下
pub fn forms_routes(prefix: &str) -> actix_web::Scope {
    web::scope(prefix).route(
        "/{handle}/submissions",
        web::post().to(FormsService::post_submission),
    )
}
