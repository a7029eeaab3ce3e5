//! Server binary - single-server deployment.
//!
//! Wires up:
//! - Local adapters (filesystem staging, ffmpeg/ffprobe subprocesses)
//! - The merge pipeline
//! - The workspace janitor
//! - HTTP inbound adapter

use splice::adapters::local::http::{router, AppState};
use splice::{FsAdapter, Janitor, LocalConfig, OrchestratorService, PipelineSettings, ProcessRunner};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = LocalConfig::from_env();

    tracing_subscriber::fmt::init();

    // 1. Adapters
    let runner = ProcessRunner::new(&config.ffmpeg_path, &config.ffprobe_path);
    let fs_adapter = FsAdapter::new();

    // 2. Application service
    let orchestrator = Arc::new(OrchestratorService::new(
        fs_adapter,
        runner,
        PipelineSettings {
            workspace_root: config.workspace_root.clone(),
            font_file: config.font_file.clone(),
        },
    ));

    // 3. Janitor
    let retention = config.retention();
    Janitor::new(&config.workspace_root, retention)
        .spawn(Duration::from_secs(config.sweep_interval_secs.max(1)));
    info!(
        root = %config.workspace_root.display(),
        retention_minutes = retention.num_minutes(),
        "workspace janitor started"
    );

    // 4. HTTP layer
    let app = router(AppState {
        orchestrator,
        max_upload_bytes: config.max_upload_bytes,
    });

    // 5. Start server
    let bind = format!("{}:{}", config.addr, config.port);
    let listener = match tokio::net::TcpListener::bind(&bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %bind, error = %e, "failed to bind TCP listener");
            std::process::exit(1);
        }
    };
    info!("Listening at {}", bind);
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
