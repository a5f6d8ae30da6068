//! HTTP Request/Response Types

use queuelength_core::application::ReporterState;
use serde::{Deserialize, Serialize};

/// `POST /work?delay=<duration>`
#[derive(Debug, Default, Deserialize)]
pub struct WorkQuery {
    pub delay: Option<String>,
}

/// Telemetry status as seen from the outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterStatus {
    Uninitialized,
    Running,
    Stopped,
    /// Credentials could not be resolved; the service runs without telemetry
    Disabled,
}

impl From<ReporterState> for ReporterStatus {
    fn from(state: ReporterState) -> Self {
        match state {
            ReporterState::Uninitialized => ReporterStatus::Uninitialized,
            ReporterState::Running => ReporterStatus::Running,
            ReporterState::Stopped => ReporterStatus::Stopped,
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub queue_length: usize,
    pub queue_capacity: usize,
    pub workers: usize,
    pub admission: String,
    pub reporter: ReporterStatus,
}
