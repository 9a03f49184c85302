//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_web::{
    App, HttpResponse, HttpServer,
    http::header::CONTENT_TYPE,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::middleware::{AdminAuth, AttributionCapture};
use crate::api::services::admin::routes::configure_admin;
use crate::api::services::forms_routes;
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// 未匹配的请求：访问已被归因中间件处理
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
        .body("Not Found")
}

/// Run the HTTP server
///
/// This function:
/// 1. Prepares server components (storage, services, prune task)
/// 2. Configures and starts the HTTP server
/// 3. Listens for graceful shutdown signals
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let storage = startup.storage.clone();
    let attribution_service = startup.attribution_service.clone();
    let report_service = startup.report_service.clone();
    let route = startup.route_config.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let server = HttpServer::new(move || {
        let capture = AttributionCapture::new(attribution_service.clone())
            .skip_prefix(route.admin_prefix.clone())
            .skip_prefix(route.forms_prefix.clone());

        App::new()
            .wrap(capture)
            .wrap(Compress::default())
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(attribution_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(
                web::scope(&route.admin_prefix)
                    .wrap(AdminAuth::new(&route.admin_token))
                    .configure(configure_admin),
            )
            .service(forms_routes(&route.forms_prefix))
            .default_service(web::to(not_found))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(startup.prune_task) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
