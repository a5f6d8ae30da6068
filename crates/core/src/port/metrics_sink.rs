// Metrics Sink Port
// Where queue-length samples are delivered (the autoscaler custom-metrics API)

use crate::domain::CustomMetrics;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Reporting errors (transient, isolated to one tick)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Fail to emit metrics with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Report timed out after {0:?}")]
    Timeout(Duration),

    #[error("Client setup failed: {0}")]
    Setup(String),
}

/// Metrics Sink trait
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Deliver one payload. Anything but an accepted delivery is an error.
    async fn push(&self, metrics: &CustomMetrics) -> Result<(), ReportError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock sink behavior
    #[derive(Debug, Clone)]
    pub enum SinkBehavior {
        /// Accept every payload
        Accept,
        /// Reject every payload with the given status
        RejectWith(u16),
        /// Never answer (for timeout testing)
        Hang,
    }

    /// Records every payload it is handed, whatever the outcome
    pub struct RecordingSink {
        behavior: Mutex<SinkBehavior>,
        pushed: Mutex<Vec<CustomMetrics>>,
    }

    impl RecordingSink {
        pub fn new(behavior: SinkBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                pushed: Mutex::new(Vec::new()),
            }
        }

        pub fn accepting() -> Self {
            Self::new(SinkBehavior::Accept)
        }

        pub fn set_behavior(&self, behavior: SinkBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn pushed(&self) -> Vec<CustomMetrics> {
            self.pushed.lock().unwrap().clone()
        }

        /// Reported queue lengths, in delivery order
        pub fn values(&self) -> Vec<u64> {
            self.pushed
                .lock()
                .unwrap()
                .iter()
                .flat_map(|m| m.metrics.iter().map(|metric| metric.value))
                .collect()
        }
    }

    #[async_trait]
    impl MetricsSink for RecordingSink {
        async fn push(&self, metrics: &CustomMetrics) -> Result<(), ReportError> {
            self.pushed.lock().unwrap().push(metrics.clone());
            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                SinkBehavior::Accept => Ok(()),
                SinkBehavior::RejectWith(status) => Err(ReportError::Status {
                    status,
                    body: "rejected by mock".to_string(),
                }),
                SinkBehavior::Hang => {
                    std::future::pending::<()>().await;
                    Ok(())
                }
            }
        }
    }
}
