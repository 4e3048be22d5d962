//! Alarm Frame Detection Service
//!
//! Detects objects in security camera alarm frames with OpenVINO and
//! optionally names the persons found, served over gRPC.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use alarmdet::api::{serve, GrpcHandler, KeepAlive};
use alarmdet::config::Config;
use alarmdet::pipeline::AlarmPipeline;
use alarmdet::service::{DetectService, Lifecycle};

#[derive(Parser, Debug)]
#[command(name = "alarmdet", version, about = "Alarm frame detection service")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = Config::default_path())]
    config: PathBuf,

    /// Log level, overridden by RUST_LOG when set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting Alarm Detection Service v{}", env!("CARGO_PKG_VERSION"));

    let lifecycle = Lifecycle::new();

    // Load configuration
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    let endpoint = config.endpoint()?;

    info!("Configuration loaded:");
    info!("  RPC endpoint: {}", endpoint);
    info!("  Device: {}", config.device);
    info!("  Object model: {}", config.model_path.display());
    for stage in &config.stages {
        info!("  {} stage model: {}", stage.kind.as_str(), stage.model_path.display());
    }
    info!("  Min score: {}", config.min_score);
    info!("  Skip count: {}", config.skip_count);
    info!("  Heartbeat: {}ms", config.heartbeat_ms);
    if !config.mount_point.as_os_str().is_empty() {
        info!("  Mount point: {}", config.mount_point.display());
    }

    // Load models once for the process lifetime
    let pipeline = Arc::new(AlarmPipeline::load(&config).context("Failed to load models")?);
    let service = Arc::new(DetectService::new(pipeline.clone(), lifecycle.clone()));

    tokio::spawn(shutdown_signal(lifecycle.clone()));

    let keep_alive = KeepAlive::from_heartbeat(Duration::from_millis(config.heartbeat_ms));
    serve(&endpoint, GrpcHandler::new(service), keep_alive, lifecycle.clone()).await?;

    // Release the models
    match Arc::try_unwrap(pipeline) {
        Ok(pipeline) => {
            drop(pipeline);
            info!("Models released");
        }
        Err(_) => warn!("Models still held by a call winding down"),
    }
    lifecycle.stopped();

    info!("Goodbye!");
    Ok(())
}

/// Begin stopping on Ctrl-C or SIGTERM.
async fn shutdown_signal(lifecycle: Lifecycle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, cleaning up...");
    lifecycle.begin_stopping();
}
