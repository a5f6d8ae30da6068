// Autoscaler custom-metrics client
// reason: reqwest (same HTTP client the CLI uses), rustls for TLS endpoints

use async_trait::async_trait;
use queuelength_core::domain::{Credentials, CustomMetrics};
use queuelength_core::port::{MetricsSink, ReportError};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// MetricsSink backed by `POST <url>/v1/apps/<app_id>/metrics`
pub struct AutoscalerClient {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
}

impl AutoscalerClient {
    /// Build a client for the given binding. Every request is bounded by `timeout`.
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self, ReportError> {
        let endpoint = credentials.metrics_url();
        reqwest::Url::parse(&endpoint)
            .map_err(|e| ReportError::Setup(format!("invalid endpoint {}: {}", endpoint, e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MetricsSink for AutoscalerClient {
    async fn push(&self, metrics: &CustomMetrics) -> Result<(), ReportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(metrics)
            .send()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(endpoint = %self.endpoint, "Metrics delivered");
        Ok(())
    }
}
