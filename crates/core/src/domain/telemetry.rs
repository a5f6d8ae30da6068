// Telemetry Domain Model
//
// Wire shapes of the autoscaler custom-metrics API and the credentials needed
// to call it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric name understood by the autoscaler policy
pub const QUEUE_LENGTH_METRIC: &str = "queuelength";

/// Credentials of an autoscaler service binding
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "app_id")]
    pub application_id: String,
    #[serde(rename = "url")]
    pub reporting_url: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// `<url>/v1/apps/<app_id>/metrics`
    pub fn metrics_url(&self) -> String {
        format!(
            "{}/v1/apps/{}/metrics",
            self.reporting_url.trim_end_matches('/'),
            self.application_id
        )
    }
}

// Keep the password out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("application_id", &self.application_id)
            .field("reporting_url", &self.reporting_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One sample taken on a reporting tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySample {
    pub instance_index: u32,
    pub metric_name: String,
    pub value: u64,
    pub unit: String,
}

impl TelemetrySample {
    pub fn queue_length(instance_index: u32, length: usize) -> Self {
        Self {
            instance_index,
            metric_name: QUEUE_LENGTH_METRIC.to_string(),
            value: length as u64,
            unit: String::new(),
        }
    }

    pub fn to_payload(&self) -> CustomMetrics {
        CustomMetrics {
            instance_index: self.instance_index,
            metrics: vec![Metric {
                name: self.metric_name.clone(),
                value: self.value,
                unit: self.unit.clone(),
            }],
        }
    }
}

/// Request body of `POST /v1/apps/<app_id>/metrics`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMetrics {
    pub instance_index: u32,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: u64,
    pub unit: String,
}
