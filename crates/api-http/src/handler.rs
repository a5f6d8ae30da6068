//! HTTP Handlers

use crate::error::ApiError;
use crate::types::{HealthResponse, ReporterStatus, WorkQuery};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use queuelength_core::application::{Dispatcher, ReporterState, StopSignal};
use queuelength_core::error::AppError;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Shared handler state with injected dependencies
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    dispatcher: Dispatcher,
    stop: StopSignal,
    reporter: Option<watch::Receiver<ReporterState>>,
    workers: usize,
}

impl AppState {
    /// `reporter` is `None` when telemetry could not be started
    pub fn new(
        dispatcher: Dispatcher,
        stop: StopSignal,
        reporter: Option<watch::Receiver<ReporterState>>,
        workers: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                dispatcher,
                stop,
                reporter,
                workers,
            }),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    fn reporter_status(&self) -> ReporterStatus {
        match &self.inner.reporter {
            Some(state) => ReporterStatus::from(*state.borrow()),
            None => ReporterStatus::Disabled,
        }
    }
}

/// POST /work?delay=<duration>
///
/// 201 once admission has been initiated. Under the detached policy that does
/// not mean the job is already buffered.
pub async fn post_work(
    State(state): State<AppState>,
    Query(query): Query<WorkQuery>,
) -> Result<StatusCode, ApiError> {
    let delay = query.delay.unwrap_or_default();
    state.dispatcher().submit(&delay)?;
    Ok(StatusCode::CREATED)
}

/// POST /emitStop
///
/// Stops the telemetry reporter. Only the first call has an effect.
pub async fn emit_stop(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    if state.inner.stop.trigger() {
        info!("Telemetry stop requested");
        Ok((StatusCode::OK, "telemetry stopped"))
    } else {
        Err(AppError::InvalidState("telemetry already stopped".to_string()).into())
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let queue = state.dispatcher().queue();
    Json(HealthResponse {
        status: if queue.is_closed() { "draining" } else { "ok" }.to_string(),
        version: queuelength_core::VERSION.to_string(),
        queue_length: queue.current_length(),
        queue_capacity: queue.capacity(),
        workers: state.inner.workers,
        admission: state.dispatcher().policy().to_string(),
        reporter: state.reporter_status(),
    })
}
