// Telemetry Reporter
//
// Periodically samples the queue length and pushes it to the autoscaler.
// Lifecycle: Uninitialized -> Running -> Stopped (terminal).

mod stop;

pub use stop::{stop_channel, StopSignal, StopToken};

use super::constants::{DEFAULT_REPORT_INTERVAL, DEFAULT_REPORT_TIMEOUT};
use crate::domain::{Credentials, JobQueue, TelemetrySample};
use crate::error::{AppError, Result};
use crate::port::{CredentialSource, MetricsSink, ReportError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

/// Reporter lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterState {
    Uninitialized,
    Running,
    Stopped,
}

/// Reporter timing
#[derive(Debug, Clone, Copy)]
pub struct ReporterConfig {
    /// Period between two reports; the first report happens one period after start
    pub interval: Duration,
    /// Upper bound on one delivery
    pub timeout: Duration,
}

impl ReporterConfig {
    /// Both durations must be non-zero
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(AppError::Config("report interval must be greater than zero".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(AppError::Config("report timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REPORT_INTERVAL,
            timeout: DEFAULT_REPORT_TIMEOUT,
        }
    }
}

/// Handle on a running reporter
pub struct ReporterHandle {
    state: watch::Receiver<ReporterState>,
    task: JoinHandle<()>,
}

impl ReporterHandle {
    pub fn state(&self) -> ReporterState {
        *self.state.borrow()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<ReporterState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to exit (only happens after a stop)
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!(error = ?e, "Telemetry reporter task ended abnormally");
        }
    }
}

/// Telemetry Reporter
pub struct TelemetryReporter {
    queue: Arc<JobQueue>,
    sink: Arc<dyn MetricsSink>,
    instance_index: u32,
    config: ReporterConfig,
    state: watch::Sender<ReporterState>,
}

impl TelemetryReporter {
    pub fn new(
        queue: Arc<JobQueue>,
        sink: Arc<dyn MetricsSink>,
        instance_index: u32,
        config: ReporterConfig,
    ) -> Self {
        let (state, _) = watch::channel(ReporterState::Uninitialized);
        Self {
            queue,
            sink,
            instance_index,
            config,
            state,
        }
    }

    /// Resolve credentials, build the sink and start reporting.
    ///
    /// Any failure leaves the reporter out of `Running`; callers log it and go
    /// on without telemetry.
    pub fn bootstrap<F>(
        queue: Arc<JobQueue>,
        source: &dyn CredentialSource,
        connect: F,
        config: ReporterConfig,
        stop: StopToken,
    ) -> Result<ReporterHandle>
    where
        F: FnOnce(&Credentials) -> std::result::Result<Arc<dyn MetricsSink>, ReportError>,
    {
        config.validate()?;
        let identity = source.resolve()?;
        let sink = connect(&identity.credentials)?;

        info!(
            instance_index = identity.instance_index,
            endpoint = %identity.credentials.metrics_url(),
            interval = ?config.interval,
            "Telemetry reporter resolved autoscaler binding"
        );

        Ok(Self::new(queue, sink, identity.instance_index, config).spawn(stop))
    }

    pub fn state(&self) -> ReporterState {
        *self.state.borrow()
    }

    /// Spawn the loop onto the runtime
    pub fn spawn(self, stop: StopToken) -> ReporterHandle {
        let state = self.state.subscribe();
        let task = tokio::spawn(self.run(stop));
        ReporterHandle { state, task }
    }

    /// Report every interval until `stop` fires
    pub async fn run(self, mut stop: StopToken) {
        if stop.is_stopped() {
            info!("Telemetry reporter stopped before it started");
            self.state.send_replace(ReporterState::Stopped);
            return;
        }
        if let Err(e) = self.config.validate() {
            error!(error = %e, "Telemetry reporter not started");
            self.state.send_replace(ReporterState::Stopped);
            return;
        }

        self.state.send_replace(ReporterState::Running);
        info!(instance_index = self.instance_index, "Telemetry reporter running");

        let mut ticker = interval_at(Instant::now() + self.config.interval, self.config.interval);
        // A slow endpoint delays the next tick instead of causing a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stop.wait() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = stop.wait() => break,
                result = self.report_once() => match result {
                    Ok(length) => info!(queue_length = length, "Current queue length"),
                    Err(e) => warn!(error = %e, "Failed to report queue length"),
                },
            }
        }

        self.state.send_replace(ReporterState::Stopped);
        info!("Emit Done!");
    }

    /// Sample the queue and push the sample once.
    ///
    /// Returns the reported length.
    pub async fn report_once(&self) -> std::result::Result<usize, ReportError> {
        let length = self.queue.current_length();
        let payload = TelemetrySample::queue_length(self.instance_index, length).to_payload();

        match tokio::time::timeout(self.config.timeout, self.sink.push(&payload)).await {
            Ok(result) => result.map(|_| length),
            Err(_) => Err(ReportError::Timeout(self.config.timeout)),
        }
    }
}
