use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 等待 Ctrl+C，然后停止后台任务
pub async fn listen_for_shutdown(background: Option<JoinHandle<()>>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    if let Some(handle) = background {
        handle.abort();
        info!("Attribution prune task stopped");
    }
}
