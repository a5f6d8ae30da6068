//! Process configuration: flags with environment fallbacks

use clap::Parser;
use queuelength_core::application::constants::{
    DEFAULT_MAX_QUEUE_SIZE, DEFAULT_MAX_WORKERS, DEFAULT_REPORT_INTERVAL, DEFAULT_REPORT_TIMEOUT,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
use queuelength_core::application::{AdmissionPolicy, ReporterConfig};
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "queuelength")]
#[command(about = "Queue-length driven worker service", long_about = None)]
#[command(version)]
pub struct Config {
    /// The size of job queue
    #[arg(long, env = "QUEUELENGTH_MAX_QUEUE_SIZE", default_value_t = DEFAULT_MAX_QUEUE_SIZE,
          value_parser = parse_positive)]
    pub max_queue_size: usize,

    /// The number of workers to start
    #[arg(long, env = "QUEUELENGTH_MAX_WORKERS", default_value_t = DEFAULT_MAX_WORKERS,
          value_parser = parse_positive)]
    pub max_workers: usize,

    /// The server port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Interface to listen on
    #[arg(long, env = "QUEUELENGTH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Period between two queue-length reports
    #[arg(long, env = "QUEUELENGTH_REPORT_INTERVAL", default_value_t = DEFAULT_REPORT_INTERVAL.into(),
          value_parser = parse_positive_duration)]
    pub report_interval: humantime::Duration,

    /// Upper bound on one report to the autoscaler
    #[arg(long, env = "QUEUELENGTH_REPORT_TIMEOUT", default_value_t = DEFAULT_REPORT_TIMEOUT.into(),
          value_parser = parse_positive_duration)]
    pub report_timeout: humantime::Duration,

    /// Admission policy when the queue is full: detached (wait in background) or reject (503)
    #[arg(long, env = "QUEUELENGTH_ADMISSION", default_value_t = AdmissionPolicy::default())]
    pub admission: AdmissionPolicy,

    /// How long shutdown waits for workers to drain queued jobs
    #[arg(long, env = "QUEUELENGTH_SHUTDOWN_TIMEOUT", default_value_t = DEFAULT_SHUTDOWN_TIMEOUT.into())]
    pub shutdown_timeout: humantime::Duration,
}

impl Config {
    pub fn reporter(&self) -> ReporterConfig {
        ReporterConfig {
            interval: self.report_interval.into(),
            timeout: self.report_timeout.into(),
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout.into()
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_positive_duration(s: &str) -> Result<humantime::Duration, String> {
    let duration: humantime::Duration = s.parse().map_err(|e: humantime::DurationError| e.to_string())?;
    if Duration::from(duration).is_zero() {
        return Err("must be greater than zero".to_string());
    }
    Ok(duration)
}
