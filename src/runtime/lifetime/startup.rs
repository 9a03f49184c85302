use crate::config::StaticConfig;
use crate::services::{AttributionService, PruneTask, ReportService};
use crate::storage::{StorageFactory, SubmissionStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn SubmissionStore>,
    pub attribution_service: Arc<AttributionService>,
    pub report_service: Arc<ReportService>,
    pub prune_task: Option<tokio::task::JoinHandle<()>>,
    pub route_config: RouteConfig,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub admin_prefix: String,
    pub forms_prefix: String,
    pub admin_token: String,
}

/// 准备服务器启动的上下文
/// 包括存储、归因服务、报表服务和定时清理任务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let attribution = Arc::new(config.attribution.clone());
    if !attribution.enabled {
        warn!("Attribution capture is disabled (attribution.enabled = false)");
    } else if attribution.consent_required && attribution.consent_cookie_name.is_none() {
        warn!(
            "Consent is required but attribution.consent_cookie_name is not set; \
             visitor attribution will never be stored"
        );
    }

    let attribution_service = Arc::new(AttributionService::new(attribution.clone()));
    let report_service = Arc::new(ReportService::new(storage.clone(), attribution.clone()));

    let prune_task = if attribution.prune_schedule_enabled {
        let task = Arc::new(PruneTask::new(storage.clone(), attribution.clone()));
        Some(task.spawn_background_task())
    } else {
        debug!("Scheduled attribution pruning is disabled");
        None
    };

    let route_config = RouteConfig {
        admin_prefix: config.routes.admin_prefix.clone(),
        forms_prefix: config.routes.forms_prefix.clone(),
        admin_token: config.api.admin_token.clone(),
    };

    if route_config.admin_token.is_empty() {
        info!("Admin API is disabled (api.admin_token not set)");
    } else {
        info!("Admin API available at: {}", route_config.admin_prefix);
    }

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        attribution_service,
        report_service,
        prune_task,
        route_config,
    })
}
