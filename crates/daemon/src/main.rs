//! Queuelength - Main Entry Point
//!
//! Accepts simulated work over HTTP, runs it on a fixed worker pool and reports
//! the queue length to the autoscaler.

mod config;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

// Import workspace crates
use queuelength_api_http::{AppState, HttpServer, HttpServerConfig};
use queuelength_core::application::{stop_channel, Dispatcher, TelemetryReporter, WorkerPool};
use queuelength_core::domain::JobQueue;
use queuelength_core::port::{MetricsSink, SleepExecutor};
use queuelength_infra_autoscaler::{AutoscalerClient, VcapCredentialSource};

use config::Config;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = Config::parse();
    logging::init_logging()?;

    info!(
        version = VERSION,
        max_queue_size = config.max_queue_size,
        max_workers = config.max_workers,
        admission = %config.admission,
        "Queuelength starting..."
    );

    // 2. Queue and worker pool
    let queue = Arc::new(JobQueue::new(config.max_queue_size).context("Invalid queue size")?);
    let pool = WorkerPool::start(config.max_workers, Arc::clone(&queue), Arc::new(SleepExecutor))
        .context("Worker pool start failed")?;

    // 3. Telemetry reporter (degraded mode when the binding is missing)
    let (stop_signal, stop_token) = stop_channel();
    let reporter_config = config.reporter();
    let reporter = match TelemetryReporter::bootstrap(
        Arc::clone(&queue),
        &VcapCredentialSource::from_env(),
        |credentials| {
            AutoscalerClient::new(credentials, reporter_config.timeout)
                .map(|client| Arc::new(client) as Arc<dyn MetricsSink>)
        },
        reporter_config,
        stop_token,
    ) {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!(error = %e, "Telemetry reporter not started, running without autoscaler metrics");
            None
        }
    };

    // 4. HTTP server
    let dispatcher = Dispatcher::new(Arc::clone(&queue), config.admission);
    let state = AppState::new(
        dispatcher,
        stop_signal.clone(),
        reporter.as_ref().map(|r| r.subscribe()),
        pool.size(),
    );
    let http_config = HttpServerConfig {
        host: config.host.clone(),
        port: config.port,
    };
    let server = HttpServer::bind(&http_config, state)
        .await
        .with_context(|| format!("Failed to bind {}:{}", http_config.host, http_config.port))?;

    info!(addr = %server.local_addr()?, "System ready. Waiting for work...");
    info!("Press Ctrl+C to shutdown");

    // 5. Serve until Ctrl+C
    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received. Exiting gracefully...");
        })
        .await
        .context("HTTP server error")?;

    // 6. Graceful shutdown: stop telemetry, drain the queue
    stop_signal.trigger();
    if let Some(reporter) = reporter {
        reporter.join().await;
    }

    queue.close();
    let pending = queue.current_length();
    if pending > 0 {
        info!(pending_jobs = pending, "Draining queued jobs...");
    }
    if !pool.join_timeout(config.shutdown_timeout()).await {
        warn!(
            pending_jobs = queue.current_length(),
            "Shutdown timeout reached with jobs still queued"
        );
    }

    info!("Shutdown complete.");
    Ok(())
}
